use crate::{browser::PageDriver,
            error::Result,
            scrape::{config::RunOptions,
                     extract::{Lookup, extract_field, first_hit},
                     profile::{FieldSpec, SiteProfile},
                     record::ProjectRecord}};

/// Reads one project's detail page into a [`ProjectRecord`]
pub struct DetailScraper<'a> {
    profile: &'a SiteProfile,
    options: &'a RunOptions,
    columns: Vec<String>,
}

impl<'a> DetailScraper<'a> {
    pub fn new(profile: &'a SiteProfile, options: &'a RunOptions) -> Self {
        Self { profile, options, columns: profile.columns() }
    }

    /// Scrape the page currently shown
    ///
    /// Returns `None` when the page never settled or otherwise failed; the caller
    /// should skip the item. Missing fields and a missing secondary tab are not
    /// failures: they leave sentinels in the record.
    pub fn scrape<D: PageDriver + ?Sized>(&self, page: &D) -> Option<ProjectRecord> {
        match self.try_scrape(page) {
            Ok(record) => Some(record),
            Err(e) => {
                log::error!("Error extracting project details: {}", e);
                None
            }
        }
    }

    fn try_scrape<D: PageDriver + ?Sized>(&self, page: &D) -> Result<ProjectRecord> {
        self.options.page_settle.settle(page)?;

        let mut record = ProjectRecord::blank(&self.columns);
        self.fill(page, &self.profile.primary_fields, &mut record);

        if self.profile.secondary_fields.is_empty() {
            return Ok(record);
        }

        if self.activate_secondary_tab(page) {
            page.pause(self.options.page_settle.grace);
            self.fill(page, &self.profile.secondary_fields, &mut record);
        } else {
            log::warn!("Secondary tab not found, keeping primary fields only");
        }

        Ok(record)
    }

    fn fill<D: PageDriver + ?Sized>(&self, page: &D, fields: &[FieldSpec], record: &mut ProjectRecord) {
        for field in fields {
            let value = extract_field(page, field, self.options.field_timeout);
            record.set(&field.name, value);
        }
    }

    fn activate_secondary_tab<D: PageDriver + ?Sized>(&self, page: &D) -> bool {
        first_hit(&self.profile.secondary_tab, |locator| {
            Lookup::from_result(page.click(locator, self.options.tab_timeout))
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{browser::Locator,
                scrape::record::SENTINEL,
                testing::{FakeDetail, FakePage}};
    use std::time::Duration;

    fn options() -> RunOptions {
        RunOptions::new().grace(Duration::from_millis(2000))
    }

    fn full_detail(profile: &SiteProfile) -> FakeDetail {
        FakeDetail::new()
            .text(&profile.primary_fields[0].locators[1], "RP/01/2024/00123")
            .text(&profile.primary_fields[1].locators[0], "Green Meadows")
            .tab(&profile.secondary_tab[0])
            .secondary_text(&profile.secondary_fields[0].locators[0], "Acme Builders Pvt Ltd")
            .secondary_text(&profile.secondary_fields[1].locators[1], "Plot 7, Bhubaneswar")
            .secondary_text(&profile.secondary_fields[2].locators[0], "21AAACA1234A1Z5")
    }

    #[test]
    fn test_scrapes_both_tabs() {
        let profile = SiteProfile::odisha_rera();
        let opts = options();
        let page = FakePage::showing(full_detail(&profile));

        let record = DetailScraper::new(&profile, &opts).scrape(&page).expect("record");

        let values: Vec<&str> = record.values().collect();
        assert_eq!(
            values,
            vec!["RP/01/2024/00123", "Green Meadows", "Acme Builders Pvt Ltd", "Plot 7, Bhubaneswar", "21AAACA1234A1Z5"]
        );
        // settle grace, then the grace after the tab switch
        assert_eq!(page.pauses(), vec![Duration::from_millis(2000), Duration::from_millis(2000)]);
    }

    #[test]
    fn test_missing_tab_keeps_primary_fields() {
        let profile = SiteProfile::odisha_rera();
        let opts = options();
        let detail = FakeDetail::new()
            .text(&profile.primary_fields[1].locators[2], "Green Meadows")
            .secondary_text(&profile.secondary_fields[0].locators[0], "hidden");
        let page = FakePage::showing(detail);

        let record = DetailScraper::new(&profile, &opts).scrape(&page).expect("record");

        assert_eq!(record.get("Project Name"), Some("Green Meadows"));
        assert_eq!(record.get("RERA Regd. No."), Some(SENTINEL));
        assert!(record.is_missing("Promoter Name"));
        assert!(record.is_missing("GST No."));
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn test_second_tab_candidate_used() {
        let profile = SiteProfile::odisha_rera();
        let opts = options();
        let detail = FakeDetail::new()
            .tab(&profile.secondary_tab[1])
            .secondary_text(&profile.secondary_fields[2].locators[1], "21BBBBB0000B1Z1");
        let page = FakePage::showing(detail);

        let record = DetailScraper::new(&profile, &opts).scrape(&page).expect("record");
        assert_eq!(record.get("GST No."), Some("21BBBBB0000B1Z1"));
    }

    #[test]
    fn test_unsettled_page_is_absent() {
        let profile = SiteProfile::odisha_rera();
        let opts = options();
        let page = FakePage::showing(full_detail(&profile));
        page.fail_idle_wait(0, 1);

        assert!(DetailScraper::new(&profile, &opts).scrape(&page).is_none());
        assert!(page.text_calls().is_empty());
    }

    #[test]
    fn test_primary_only_profile_never_clicks() {
        let mut profile = SiteProfile::odisha_rera();
        profile.secondary_fields.clear();
        profile.secondary_tab = vec![Locator::css("#never")];
        let opts = options();
        let page = FakePage::showing(FakeDetail::new());

        let record = DetailScraper::new(&profile, &opts).scrape(&page).expect("record");
        assert_eq!(record.len(), 2);
        assert_eq!(page.pauses().len(), 1);
    }
}
