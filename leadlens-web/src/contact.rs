use crate::fetcher::{PageFetcher, RenderPlan};
use leadlens_common::Result;
use leadlens_extract::{extract_contact_info, harvest_emails, StructuredPageData};

/// Fetch `url` and bundle its raw HTML with the contact details found in it.
pub async fn query_page_content<F>(fetcher: &mut F, url: &str) -> Result<StructuredPageData>
where
    F: PageFetcher + ?Sized,
{
    let raw_html = fetcher
        .fetch_rendered_html(url, &RenderPlan::immediate())
        .await?;
    let contact_info = extract_contact_info(&raw_html);
    let harvested_emails = harvest_emails(&raw_html);
    tracing::info!(
        target: "search.contact",
        %url,
        socials = contact_info.social_media.len(),
        has_email = contact_info.email.is_some(),
        has_phone = contact_info.phone.is_some(),
        harvested = harvested_emails.len(),
        "extracted contact info"
    );
    Ok(StructuredPageData {
        url: url.to_string(),
        raw_html,
        contact_info,
        harvested_emails,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;
    use leadlens_extract::SocialPlatform;

    #[tokio::test]
    async fn bundles_html_and_contact_record() {
        let html = r#"<html><body>
            <main><h1>Maguey Spirits</h1><p>Small batch mezcal.</p></main>
            <a class="link-foot-social" href="https://instagram.com/maguey">ig</a>
            <a href="tel:+15551234567">Call</a>
            <p>orders@maguey.com</p>
        </body></html>"#;
        let mut fetcher = FakeFetcher::with_page("https://maguey.com", html);

        let data = query_page_content(&mut fetcher, "https://maguey.com")
            .await
            .unwrap();

        assert_eq!(data.url, "https://maguey.com");
        assert_eq!(data.raw_html, html);
        assert_eq!(data.contact_info.phone.as_deref(), Some("+15551234567"));
        assert_eq!(data.contact_info.email, None);
        assert_eq!(
            data.contact_info.social_media.get(&SocialPlatform::Instagram).map(String::as_str),
            Some("https://instagram.com/maguey")
        );
        assert_eq!(
            data.contact_info.company_info.as_deref(),
            Some("Maguey Spirits Small batch mezcal.")
        );
        assert_eq!(data.harvested_emails, vec!["orders@maguey.com"]);
        assert_eq!(fetcher.requests(), vec!["https://maguey.com".to_string()]);
    }

    #[tokio::test]
    async fn fetch_failures_propagate() {
        let mut fetcher = FakeFetcher::default();
        assert!(query_page_content(&mut fetcher, "https://down.example")
            .await
            .is_err());
    }
}
