// file: src/utils/validation.rs
// description: input validation for identifiers, limits and endpoints
// reference: input validation patterns

use crate::error::{ApiError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISSUE_KEY: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*-[0-9]+$").expect("ISSUE_KEY regex is valid");
    static ref PROJECT_KEY: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("PROJECT_KEY regex is valid");
}

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ApiError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        reqwest::Url::parse(url)
            .map_err(|e| ApiError::Validation(format!("Invalid URL {}: {}", url, e)))?;
        Ok(())
    }

    pub fn normalize_base_url(url: &str) -> String {
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn validate_limit(limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(ApiError::Validation(
                "limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Page ids are numeric content ids.
    pub fn validate_page_id(id: &str) -> Result<()> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::Validation(format!(
                "Invalid page id: {:?}",
                id
            )));
        }
        Ok(())
    }

    pub fn validate_issue_key(key: &str) -> Result<()> {
        if !ISSUE_KEY.is_match(key) {
            return Err(ApiError::Validation(format!(
                "Invalid issue key: {:?}",
                key
            )));
        }
        Ok(())
    }

    pub fn is_project_key(key: &str) -> bool {
        PROJECT_KEY.is_match(key)
    }

    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(ApiError::Validation("Query is empty".to_string()));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        }
    }
}
