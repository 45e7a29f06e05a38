//! Local web dashboard adapter.
//!
//! Implements [`DashboardPort`]. Card updates are staged in RAM; `flush`
//! serialises all five cards into a JSON snapshot shared with the HTTP
//! handlers. The page at `/` polls `/cards.json` and redraws.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpServer` on the soft-AP.
//! - **all other targets**: the snapshot is only kept in memory.

use std::sync::{Arc, Mutex};

use log::warn;
use serde::Serialize;

#[cfg(target_os = "espidf")]
use esp_idf_svc::http::Method;
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpServer};
#[cfg(target_os = "espidf")]
use esp_idf_svc::io::Write;

use crate::app::ports::{CardId, CardUpdate, DashboardPort};
use crate::telemetry::compact_number;

#[cfg(target_os = "espidf")]
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width">
<title>Smart Kitchen</title>
<style>
body{font-family:sans-serif;background:#f2f2f2;margin:1em}
.card{display:inline-block;width:10em;margin:.5em;padding:1em;background:#fff;border-radius:6px}
.card h3{margin:0 0 .5em;font-size:1em;color:#555}.v{font-size:1.6em}
.danger .v{color:#c00}.normal .v{color:#080}
</style></head><body><div id="c"></div><script>
async function r(){const d=await (await fetch('/cards.json')).json();
document.getElementById('c').innerHTML=d.map(c=>`<div class="card ${c.severity||''}"><h3>${c.title}</h3><span class="v">${c.value} ${c.unit}</span></div>`).join('');}
r();setInterval(r,2000);
</script></body></html>"#;

/// What one card currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
enum CardValue {
    Empty,
    Number(#[serde(serialize_with = "compact_number")] f32),
    Count(i32),
    Label(&'static str),
}

#[derive(Serialize)]
struct CardView {
    title: &'static str,
    unit: &'static str,
    value: CardValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CardState {
    value: CardValue,
    severity: Option<&'static str>,
}

pub struct WebDashboard {
    cards: [CardState; CardId::ALL.len()],
    snapshot: Arc<Mutex<String>>,
    #[cfg(target_os = "espidf")]
    server: Option<EspHttpServer<'static>>,
}

impl Default for WebDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl WebDashboard {
    pub fn new() -> Self {
        Self {
            cards: [CardState {
                value: CardValue::Empty,
                severity: None,
            }; CardId::ALL.len()],
            snapshot: Arc::new(Mutex::new(String::from("[]"))),
            #[cfg(target_os = "espidf")]
            server: None,
        }
    }

    /// Serve the page and snapshot on `port` (the soft-AP interface).
    #[cfg(target_os = "espidf")]
    pub fn serve(&mut self, port: u16) -> anyhow::Result<()> {
        let mut server = EspHttpServer::new(&HttpConfiguration {
            http_port: port,
            ..Default::default()
        })?;

        server.fn_handler("/", Method::Get, |req| -> anyhow::Result<()> {
            req.into_ok_response()?.write_all(INDEX_HTML.as_bytes())?;
            Ok(())
        })?;

        let snapshot = Arc::clone(&self.snapshot);
        server.fn_handler("/cards.json", Method::Get, move |req| -> anyhow::Result<()> {
            let body = snapshot
                .lock()
                .map(|s| s.clone())
                .map_err(|_| anyhow::anyhow!("dashboard snapshot poisoned"))?;
            req.into_response(200, None, &[("Content-Type", "application/json")])?
                .write_all(body.as_bytes())?;
            Ok(())
        })?;

        log::info!("Dashboard: serving on port {}", port);
        self.server = Some(server);
        Ok(())
    }

    /// Current JSON snapshot (as of the last `flush`).
    pub fn snapshot(&self) -> String {
        self.snapshot.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn render(&self) -> serde_json::Result<String> {
        let views: Vec<CardView> = CardId::ALL
            .iter()
            .map(|&id| {
                let card = self.cards[id.index()];
                CardView {
                    title: id.title(),
                    unit: id.unit(),
                    value: card.value,
                    severity: card.severity,
                }
            })
            .collect();
        serde_json::to_string(&views)
    }
}

impl DashboardPort for WebDashboard {
    fn update_card(&mut self, card: CardId, update: CardUpdate) {
        self.cards[card.index()] = match update {
            CardUpdate::Value(v) => CardState {
                value: CardValue::Number(v),
                severity: None,
            },
            CardUpdate::Count(n) => CardState {
                value: CardValue::Count(n),
                severity: None,
            },
            CardUpdate::Status { label, severity } => CardState {
                value: CardValue::Label(label),
                severity: Some(severity.as_str()),
            },
        };
    }

    fn flush(&mut self) {
        let json = match self.render() {
            Ok(json) => json,
            Err(e) => {
                warn!("Dashboard: snapshot encode failed: {}", e);
                return;
            }
        };
        match self.snapshot.lock() {
            Ok(mut s) => *s = json,
            Err(_) => warn!("Dashboard: snapshot lock poisoned"),
        }
    }
}
