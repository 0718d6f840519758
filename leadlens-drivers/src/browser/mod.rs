pub mod behavioral;
pub mod driver;
pub mod fingerprint;
pub mod page;
pub mod stealth;
