//! Endpoint catalog served at the root path.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::AppState;

/// Creates the catalog route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(api_info))
}

/// GET `/` - Describe the available endpoints. Documentation only.
async fn api_info() -> Json<Value> {
    Json(catalog())
}

fn catalog() -> Value {
    json!({
        "name": "Filegate File Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": {
                "url": "/upload/",
                "method": "POST",
                "description": "Upload a file to the bucket",
                "example": "curl -X POST -F \"file=@/path/to/file.txt\" http://localhost:8080/upload/"
            },
            "download": {
                "url": "/download/<file_key>/",
                "method": "GET",
                "description": "Download a file from the bucket",
                "example": "curl -O http://localhost:8080/download/<file_key>/"
            },
            "delete": {
                "url": "/delete/<file_key>/",
                "method": "DELETE",
                "description": "Delete a file from the bucket",
                "example": "curl -X DELETE http://localhost:8080/delete/<file_key>/"
            },
            "list": {
                "url": "/list/",
                "method": "GET",
                "description": "List files in the bucket",
                "parameters": {
                    "prefix": "Filter files by prefix (optional)",
                    "max_keys": "Maximum number of files to return (optional, default: 100)"
                },
                "example": "curl \"http://localhost:8080/list/?prefix=images/&max_keys=50\""
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_endpoint() {
        let catalog = catalog();
        let endpoints = catalog["endpoints"].as_object().expect("endpoints object");

        let mut names: Vec<_> = endpoints.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["delete", "download", "list", "upload"]);

        assert_eq!(endpoints["upload"]["method"], "POST");
        assert_eq!(endpoints["delete"]["method"], "DELETE");
        assert!(endpoints["list"]["parameters"]["max_keys"].is_string());
    }
}
