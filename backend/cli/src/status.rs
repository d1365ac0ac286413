//! `ocrlabel status`: probe a running server the way a reviewer would.

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

/// One line summarising `GET /api/images/next`.
pub fn describe_next(status: StatusCode, body: &Value) -> String {
    if !status.is_success() {
        let detail = body["detail"].as_str().unwrap_or("no detail");
        return format!("Next image endpoint failed: {status} ({detail})");
    }
    match (body["image_name"].as_str(), body["message"].as_str()) {
        (Some(name), _) => format!("Next image:   {name}"),
        (None, Some(message)) => format!("Message:      {message}"),
        (None, None) => "Message:      No message".to_string(),
    }
}

async fn body_json(resp: reqwest::Response) -> Value {
    resp.json().await.unwrap_or(Value::Null)
}

pub async fn print_status(base: &str) -> Result<()> {
    println!("OCR labeling service at {base}: checking...");
    let client = reqwest::Client::new();

    let identity = match client.get(format!("{base}/")).send().await {
        Ok(resp) => resp,
        Err(_) => {
            println!("Service is not running at {base}");
            return Ok(());
        }
    };
    if !identity.status().is_success() {
        println!("Service answered {} at {base}/", identity.status());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&body_json(identity).await)?);

    let resp = client.get(format!("{base}/api/images")).send().await?;
    if resp.status().is_success() {
        let images = body_json(resp).await;
        println!("Total images: {}", images["total_images"]);
        println!("Processed:    {}", images["processed_images"]);
        println!("Remaining:    {}", images["remaining_images"]);
    } else {
        println!("Images endpoint failed: {}", resp.status());
    }

    let resp = client.get(format!("{base}/api/images/next")).send().await?;
    let status = resp.status();
    println!("{}", describe_next(status, &body_json(resp).await));
    Ok(())
}
