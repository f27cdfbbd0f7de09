//! Contract with the external DOM tagging script.
//!
//! The script itself is injected by a collaborator and is out of scope here;
//! this module only fixes the call surface: `tagifyWebpage` annotates
//! interactive elements and returns an element-id-to-locator map,
//! `removeTags` undoes the annotation.

use std::collections::HashMap;

use crate::driver::{DriverError, Page};
use crate::error::BrowserError;

/// Ask the injected script to tag the page.
///
/// Returns the element id → locator map the agent loop uses to resolve the
/// element ids carried by web actions.
pub async fn tagify_webpage(
    page: &dyn Page,
    tag_text_elements: bool,
) -> Result<HashMap<u64, String>, BrowserError> {
    let value = page
        .evaluate(&format!("tagifyWebpage({tag_text_elements})"))
        .await?;
    let raw: HashMap<String, String> = serde_json::from_value(value)
        .map_err(|e| DriverError::Evaluate(format!("unexpected tag map payload: {e}")))?;

    let mut tags = HashMap::with_capacity(raw.len());
    for (id, locator) in raw {
        let id = id
            .parse::<u64>()
            .map_err(|e| DriverError::Evaluate(format!("non-numeric element id {id}: {e}")))?;
        tags.insert(id, locator);
    }
    Ok(tags)
}

/// Remove previously applied tags from the page.
pub async fn remove_tags(page: &dyn Page) -> Result<(), BrowserError> {
    page.evaluate("removeTags()").await?;
    Ok(())
}
