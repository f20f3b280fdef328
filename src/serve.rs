//! Web server for the interactive 3D embedding viewer
//!
//! Serves a single page with the three selectors and a Plotly surface. Every
//! selector change fetches `/api/figure`, which is resolved synchronously
//! against the read-only dataset store.

use crate::output::{gzip_bytes, RenderOutput};
use crate::resolve::resolve;
use crate::selection::{selector_descriptions, Selection};
use crate::store::DatasetStore;
use anyhow::Result;
use std::collections::HashMap;
use tiny_http::{Header, Request, Response, Server};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>popscatter</title>
<script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
<style>
  body { font-family: "Open Sans", "HelveticaNeue", Helvetica, Arial, sans-serif; margin: 0; }
  #controls { text-align: center; }
  .control { width: 20%; display: inline-block; padding: 10px 20px; text-align: left; }
  .control label { display: block; font-weight: 600; margin-bottom: 4px; }
  .control select { width: 100%; height: 36px; }
  #genome-scatter { height: 800px; }
  #error { color: #b00; text-align: center; }
</style>
</head>
<body>
<div id="controls"></div>
<div id="error"></div>
<div id="genome-scatter"></div>
<script>
const controls = document.getElementById('controls');
const errorBox = document.getElementById('error');

function currentQuery() {
  const params = new URLSearchParams();
  controls.querySelectorAll('select').forEach(s => params.set(s.id, s.value));
  return params.toString();
}

async function refresh() {
  const resp = await fetch('/api/figure?' + currentQuery());
  const body = await resp.json();
  if (!resp.ok) {
    errorBox.textContent = body.error;
    return;
  }
  errorBox.textContent = '';
  Plotly.react('genome-scatter', body.figure.data, body.figure.layout);
}

fetch('/api/options').then(r => r.json()).then(selectors => {
  for (const sel of selectors) {
    const div = document.createElement('div');
    div.className = 'control';
    const label = document.createElement('label');
    label.textContent = sel.label;
    label.htmlFor = sel.id;
    const select = document.createElement('select');
    select.id = sel.id;
    for (const opt of sel.options) {
      const o = document.createElement('option');
      o.value = opt.value;
      o.textContent = opt.label;
      select.appendChild(o);
    }
    select.value = sel.value;
    select.addEventListener('change', refresh);
    div.appendChild(label);
    div.appendChild(select);
    controls.appendChild(div);
  }
  refresh();
});
</script>
</body>
</html>
"#;

/// A routed response before it is handed to tiny_http
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub gzipped: bool,
}

impl Reply {
    fn json(status: u16, body: String) -> Self {
        Reply {
            status,
            content_type: "application/json",
            body: body.into_bytes(),
            gzipped: false,
        }
    }

    fn not_found() -> Self {
        Reply {
            status: 404,
            content_type: "text/plain",
            body: b"Not found".to_vec(),
            gzipped: false,
        }
    }
}

/// Start the web server and block serving requests
pub fn start_server(store: &DatasetStore, port: u16, open_browser: bool) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let server = Server::http(&addr).map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    let url = format!("http://localhost:{}", port);
    log::info!("Server running at {}", url);
    log::info!("Press Ctrl+C to stop");

    if open_browser {
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("Could not open browser: {}. Please open {} manually.", e, url);
        }
    }

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let reply = match route(store, &url, accepts_gzip(&request)) {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Failed to handle {}: {:#}", url, e);
                Reply::json(500, serde_json::json!({ "error": e.to_string() }).to_string())
            }
        };
        log::debug!("{} -> {} ({} bytes)", url, reply.status, reply.body.len());

        let mut response = Response::from_data(reply.body)
            .with_status_code(reply.status)
            .with_header(Header::from_bytes("Content-Type", reply.content_type).unwrap());
        if reply.gzipped {
            response = response.with_header(Header::from_bytes("Content-Encoding", "gzip").unwrap());
        }

        if let Err(e) = request.respond(response) {
            log::error!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

fn accepts_gzip(request: &Request) -> bool {
    request
        .headers()
        .iter()
        .any(|h| h.field.equiv("Accept-Encoding") && h.value.as_str().contains("gzip"))
}

/// Map a request URL to a reply
pub fn route(store: &DatasetStore, url: &str, gzip: bool) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or("");

    let reply = match path {
        "/" | "/index.html" => Reply {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: INDEX_HTML.as_bytes().to_vec(),
            gzipped: false,
        },
        "/api/options" => Reply::json(200, serde_json::to_string(&selector_descriptions())?),
        "/api/summary" => Reply::json(200, serde_json::to_string(&store.summary())?),
        "/api/figure" => {
            let params = parse_query_params(url);
            let selection = Selection::parse(
                params.get("pca-type").map(String::as_str),
                params.get("include-xy").map(String::as_str),
                params.get("group-by").map(String::as_str),
            );
            match selection {
                Ok(selection) => {
                    let groups = resolve(store, selection);
                    let json = RenderOutput::new(selection, &groups).to_json(true)?;
                    if gzip {
                        Reply {
                            status: 200,
                            content_type: "application/json",
                            body: gzip_bytes(json.as_bytes())?,
                            gzipped: true,
                        }
                    } else {
                        Reply::json(200, json)
                    }
                }
                Err(e) => {
                    log::warn!("Rejected selection: {}", e);
                    Reply::json(400, serde_json::json!({ "error": e.to_string() }).to_string())
                }
            }
        }
        _ => Reply::not_found(),
    };
    Ok(reply)
}

/// Parse query parameters from URL path
fn parse_query_params(path: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = path.split('?').nth(1) {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                // Selector values are plain tokens; only decode the common escapes
                let decoded = value
                    .replace("%20", " ")
                    .replace("%2D", "-")
                    .replace("%2d", "-")
                    .replace('+', " ");
                params.insert(key.to_string(), decoded);
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::fixture_store;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("/api/figure?pca-type=kernel&include-xy=exclude%2Dxy&group-by=pop");
        assert_eq!(params["pca-type"], "kernel");
        assert_eq!(params["include-xy"], "exclude-xy");
        assert_eq!(params["group-by"], "pop");
        assert!(parse_query_params("/api/figure").is_empty());
    }

    #[test]
    fn test_figure_route() {
        let store = fixture_store();
        let reply = route(&store, "/api/figure?pca-type=dual&include-xy=whole-genome&group-by=gender", false).unwrap();
        assert_eq!(reply.status, 200);
        let value: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        let names: Vec<&str> = value["figure"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Male", "Female"]);
    }

    #[test]
    fn test_figure_defaults_when_params_missing() {
        let store = fixture_store();
        let reply = route(&store, "/api/figure", false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(value["selection"]["group-by"], "spop");
        assert_eq!(value["figure"]["data"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_invalid_selection_is_400() {
        let store = fixture_store();
        let reply = route(&store, "/api/figure?group-by=country", false).unwrap();
        assert_eq!(reply.status, 400);
        let value: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("country"));
        assert!(value.get("figure").is_none());
    }

    #[test]
    fn test_gzip_figure() {
        let store = fixture_store();
        let plain = route(&store, "/api/figure", false).unwrap();
        let packed = route(&store, "/api/figure", true).unwrap();
        assert!(packed.gzipped);

        let mut body = Vec::new();
        GzDecoder::new(packed.body.as_slice()).read_to_end(&mut body).unwrap();
        assert_eq!(body, plain.body);
    }

    #[test]
    fn test_other_routes() {
        let store = fixture_store();
        assert_eq!(route(&store, "/", false).unwrap().content_type, "text/html; charset=utf-8");
        assert_eq!(route(&store, "/nope", false).unwrap().status, 404);

        let options = route(&store, "/api/options", false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&options.body).unwrap();
        assert_eq!(value[1]["label"], "Include Sex Chromosomes?");

        let summary = route(&store, "/api/summary", false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&summary.body).unwrap();
        assert_eq!(value["total_samples"], 3);
    }
}
