use crate::{browser::Locator,
            error::{Result, ScrapeError}};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

/// Default listing page of the Odisha RERA portal
pub const ODISHA_RERA_LISTING_URL: &str = "https://rera.odisha.gov.in/projects/project-list";

/// A logical output column and the locators that may hold its value, in priority order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    /// Column name in the output table
    pub name: String,

    /// Locator candidates, tried first to last
    pub locators: Vec<Locator>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, locators: Vec<Locator>) -> Self {
        Self { name: name.into(), locators }
    }
}

/// Everything site-specific the scraper needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SiteProfile {
    /// Listing page holding the entry points
    pub listing_url: String,

    /// Matches every "open details" control on the listing page
    pub entry_point: Locator,

    /// Fields on the tab shown when the detail page opens
    pub primary_fields: Vec<FieldSpec>,

    /// Candidates for the control that reveals the secondary tab
    #[serde(default)]
    pub secondary_tab: Vec<Locator>,

    /// Fields read after the secondary tab is activated
    #[serde(default)]
    pub secondary_fields: Vec<FieldSpec>,
}

impl SiteProfile {
    /// Built-in profile for the Odisha RERA project list
    pub fn odisha_rera() -> Self {
        Self {
            listing_url: ODISHA_RERA_LISTING_URL.to_string(),
            entry_point: Locator::link_with_text("View Details"),
            primary_fields: vec![
                FieldSpec::new(
                    "RERA Regd. No.",
                    vec![
                        Locator::sibling_of_text("RERA Regd. No."),
                        Locator::cell_after_label("RERA Regd. No."),
                        Locator::block_after_label("RERA Regd. No."),
                    ],
                ),
                FieldSpec::new(
                    "Project Name",
                    vec![
                        Locator::sibling_of_text("Project Name"),
                        Locator::cell_after_label("Project Name"),
                        Locator::block_after_label("Project Name"),
                    ],
                ),
            ],
            secondary_tab: vec![Locator::link_with_text("Promoter Details"), Locator::any_with_text("Promoter Details")],
            secondary_fields: vec![
                FieldSpec::new(
                    "Promoter Name",
                    vec![Locator::cell_after_label("Company Name"), Locator::sibling_of_text("Company Name")],
                ),
                FieldSpec::new(
                    "Address of the Promoter",
                    vec![
                        Locator::cell_after_label("Registered Office Address"),
                        Locator::sibling_of_text("Registered Office Address"),
                    ],
                ),
                FieldSpec::new(
                    "GST No.",
                    vec![Locator::cell_after_label("GST No."), Locator::sibling_of_text("GST No.")],
                ),
            ],
        }
    }

    /// Load a profile from a JSON file and validate it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let profile: SiteProfile = serde_json::from_str(&text)?;
        profile.validate()?;
        log::debug!("Loaded site profile from {}", path.display());
        Ok(profile)
    }

    /// Output columns: primary fields, then secondary fields
    pub fn columns(&self) -> Vec<String> {
        self.primary_fields
            .iter()
            .chain(self.secondary_fields.iter())
            .map(|field| field.name.clone())
            .collect()
    }

    /// Reject profiles that could not produce a well-formed table
    pub fn validate(&self) -> Result<()> {
        if self.listing_url.trim().is_empty() {
            return Err(ScrapeError::InvalidProfile("listing_url is empty".to_string()));
        }

        let columns = self.columns();
        if columns.is_empty() {
            return Err(ScrapeError::InvalidProfile("no fields defined".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &columns {
            if name.trim().is_empty() {
                return Err(ScrapeError::InvalidProfile("field with empty name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ScrapeError::InvalidProfile(format!("duplicate field '{}'", name)));
            }
        }

        if !self.secondary_fields.is_empty() && self.secondary_tab.is_empty() {
            return Err(ScrapeError::InvalidProfile(
                "secondary fields defined without a secondary tab locator".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::odisha_rera()
    }
}
