//! Basic example demonstrating configured GET and POST requests.
//!
//! This example shows how to:
//! - Configure a service once with a base URL and endpoint template
//! - Make GET requests with per-call params and query entries
//! - Make POST requests with a JSON body
//! - Inspect normalized results and typed errors
//!
//! Run with: `cargo run --example basic_call`

use fetchwright::{Configurator, Content, Endpoint, Error, Settings};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("fetchwright=debug,basic_call=info")
        .init();

    let api = Configurator::builder()
        .service_url("https://jsonplaceholder.typicode.com/")?
        .endpoint(Endpoint::new(|params| match params.get("id") {
            Some(id) => format!("posts/{}", fetchwright::value_to_string(id)),
            None => "posts".to_string(),
        }))
        .build()?;

    println!("=== GET Request Example ===");
    let result = api.get(Settings::new().param("id", 1)).await?;
    if let Some(Ok(post)) = result.content.json::<Post>() {
        println!("Post ID: {}", post.id);
        println!("Title: {}", post.title);
    }
    println!("Status: {}, type: {}", result.status, result.content_type);
    println!();

    println!("=== GET With Query Example ===");
    let result = api
        .get(Settings::new().query_param("userId", json!([1, 2])))
        .await?;
    if let Content::Json(posts) = &result.content {
        println!("Fetched {} posts from {}", posts.as_array().map_or(0, Vec::len), result.response.url);
    }
    println!();

    println!("=== POST Request Example ===");
    let result = api
        .post(Settings::new().body(&json!({
            "title": "My New Post",
            "body": "This is the content of my new post!",
            "userId": 1,
        }))?)
        .await?;
    println!("Created with status {}: {:?}", result.status, result.content.as_json());
    println!();

    println!("=== Error Example ===");
    match api.get(Settings::new().param("id", "does-not-exist")).await {
        Ok(result) => println!("Unexpected success: {}", result.status),
        Err(Error::Response { result, message }) => {
            println!("{}", message);
            println!("Body: {:?}", result.raw_content);
        }
        Err(e) => println!("Other error: {}", e),
    }

    Ok(())
}
