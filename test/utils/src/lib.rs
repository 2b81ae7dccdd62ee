use serde_json::json;
use serde_json::Value;

/// Response body for a generation request the service answered right away,
/// image included.
pub fn sync_image_body(url: &str, filename: &str, generation_time: f64) -> String {
    return json!({
        "image_url": url,
        "filename": filename,
        "generation_time": generation_time,
    })
    .to_string();
}

/// Response body for a generation request the service accepted for
/// background processing.
pub fn accepted_body(task_id: &str) -> String {
    return json!({ "task_id": task_id }).to_string();
}

/// Status body for a task still working. `progress` may be a JSON number or
/// a string, both of which the real service has been observed to send.
pub fn processing_status(progress: Value) -> String {
    return json!({ "status": "processing", "progress": progress }).to_string();
}

/// Status body for a finished task carrying its image.
pub fn completed_status(url: &str, filename: &str, generation_time: f64) -> String {
    return json!({
        "status": "completed",
        "progress": 100,
        "result": {
            "cloud_url": url,
            "filename": filename,
            "generation_time": generation_time,
        },
    })
    .to_string();
}

/// Status body for a task the service gave up on.
pub fn failed_status(error: Option<&str>) -> String {
    match error {
        Some(message) => return json!({ "status": "failed", "error": message }).to_string(),
        None => return json!({ "status": "failed" }).to_string(),
    }
}

/// Profile body returned by the auth endpoint.
pub fn profile_body(id: &str, username: &str, tier: &str, coins: i64) -> String {
    return json!({
        "id": id,
        "username": username,
        "tier": tier,
        "coins": coins,
    })
    .to_string();
}
