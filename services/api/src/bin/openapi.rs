//! services/api/src/bin/openapi.rs
//!
//! Writes the AfriLead OpenAPI document to disk, so the frontend can generate
//! its client without a running server. Usage: `openapi [OUTPUT_PATH]`.

use afrilead_api::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let doc = ApiDoc::openapi();
    std::fs::write(&path, doc.to_pretty_json()?)?;
    println!(
        "Wrote {} paths of the OpenAPI document to {}",
        doc.paths.paths.len(),
        path
    );
    Ok(())
}
