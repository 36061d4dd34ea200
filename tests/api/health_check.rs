use crate::helper::spawn_app;
use storefront::db::drop_database;

#[tokio::test]
async fn health_check_works() {
    //arrange
    let app = spawn_app().await;

    //act
    let response = app
        .api_client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    //assert
    assert!(response.status().is_success());
    drop_database(&app.database_name);
}
