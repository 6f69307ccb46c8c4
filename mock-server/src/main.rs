use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("GH_TOKEN").unwrap_or_else(|_| "test-token".to_string());
    let org = std::env::var("ORG_NAME").unwrap_or_else(|_| "acme".to_string());
    let db = mock_server::Db::new(&token, &org).with_team("students", 1);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr} (org '{org}', team 'students' = 1)");
    mock_server::run(listener, db).await
}
