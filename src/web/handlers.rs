//! HTTP handlers for API endpoints.

use crate::meter::{MeterConfig, MeterQuery, SwrSnapshot};
use axum::{
    extract::State,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// `/api/swr` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwrReading {
    pub forward_power: f64,
    pub reverse_power: f64,
    pub swr: f64,
    pub reflection_coefficient: f64,
    pub power_loss: f64,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl From<SwrSnapshot> for SwrReading {
    fn from(snapshot: SwrSnapshot) -> Self {
        Self {
            forward_power: snapshot.forward_power,
            reverse_power: snapshot.reverse_power,
            swr: snapshot.swr,
            reflection_coefficient: snapshot.reflection_coefficient,
            power_loss: snapshot.power_loss_percent,
            timestamp: snapshot.local_timestamp(),
        }
    }
}

/// Get the latest SWR reading as JSON.
pub async fn get_swr(State(query): State<MeterQuery>) -> Json<SwrReading> {
    Json(query.get_snapshot().into())
}

/// Get the calibration factors and ADC channels as JSON.
pub async fn get_config(State(query): State<MeterQuery>) -> Json<MeterConfig> {
    Json(query.get_config())
}

/// Health check endpoint.
pub async fn health_check(State(query): State<MeterQuery>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "swr-meter",
        "version": env!("CARGO_PKG_VERSION"),
        "sampling": query.is_live(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Serve a minimal dashboard when the static directory has no index page.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SWR Meter</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1e2230;
            color: #e8e8e8;
            display: flex;
            justify-content: center;
            padding: 40px 20px;
        }

        .card {
            background: #2a3042;
            border-radius: 12px;
            padding: 30px;
            min-width: 320px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.3);
        }

        .swr {
            font-size: 4rem;
            font-weight: bold;
            text-align: center;
            margin: 10px 0 20px;
        }

        .swr.warn { color: #ffb347; }
        .swr.bad { color: #ff6b6b; }

        .metric {
            display: flex;
            justify-content: space-between;
            padding: 8px 0;
            border-bottom: 1px solid #3a4158;
        }

        .metric:last-child { border-bottom: none; }

        .label { color: #9aa3bd; }
    </style>
</head>
<body>
    <div class="card">
        <h2>SWR Meter</h2>
        <div class="swr" id="swr">--</div>
        <div class="metric"><span class="label">Forward</span><span id="fwd">--</span></div>
        <div class="metric"><span class="label">Reflected</span><span id="rev">--</span></div>
        <div class="metric"><span class="label">Reflection coefficient</span><span id="rho">--</span></div>
        <div class="metric"><span class="label">Power loss</span><span id="loss">--</span></div>
        <div class="metric"><span class="label">Updated</span><span id="ts">--</span></div>
    </div>

    <script>
        function refresh() {
            fetch('/api/swr')
                .then(response => response.json())
                .then(data => {
                    const swr = document.getElementById('swr');
                    swr.textContent = data.swr.toFixed(2);
                    swr.className = 'swr' + (data.swr >= 3 ? ' bad' : data.swr >= 1.5 ? ' warn' : '');
                    document.getElementById('fwd').textContent = `${data.forward_power.toFixed(2)} W`;
                    document.getElementById('rev').textContent = `${data.reverse_power.toFixed(2)} W`;
                    document.getElementById('rho').textContent = data.reflection_coefficient.toFixed(4);
                    document.getElementById('loss').textContent = `${data.power_loss.toFixed(2)} %`;
                    document.getElementById('ts').textContent = data.timestamp;
                })
                .catch(error => console.error('Failed to fetch reading:', error));
        }

        refresh();
        setInterval(refresh, 500);
    </script>
</body>
</html>"#;
