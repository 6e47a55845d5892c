use actix_web::{http::StatusCode, test, App};
use serde_json::json;

use crate::{
	models::{ApiResponse, Empty},
	tests::{
		fixtures::TestFixtures,
		test_utils::{unreachable_pool, wiring, RecordingSink},
	},
};

#[actix_web::test]
async fn test_credit_with_invalid_amount() {
	let pool = unreachable_pool();
	let sink = RecordingSink::new();
	let app = test::init_service(App::new().configure(wiring(pool.clone(), sink.clone()))).await;

	for bad in [
		json!(0),
		json!(-100),
		json!("abc"),
		json!(null),
		json!("1e-1000000000000"),
		json!("1e1000000000"),
	] {
		let resp = test::TestRequest::post()
			.uri("/api/v1/wallet/12/credit")
			.set_json(&TestFixtures::amount(bad.clone()))
			.send_request(&app)
			.await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "amount {}", bad);
		let body: ApiResponse<Empty> = test::read_body_json(resp).await;
		assert_eq!(body.message, "Invalid amount");
		assert_eq!(body.status_message, "Amount must be a number greater than zero.");
	}
	assert!(sink.contains("Credit wallet failed (Invalid amount)"));
	assert_eq!(pool.state().connections, 0);
}

#[actix_web::test]
async fn test_debit_with_invalid_user_id() {
	let app =
		test::init_service(App::new().configure(wiring(unreachable_pool(), RecordingSink::new())))
			.await;

	let resp = test::TestRequest::post()
		.uri("/api/v1/wallet/abc/debit")
		.set_json(&TestFixtures::credit(10))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<Empty> = test::read_body_json(resp).await;
	assert_eq!(body.message, "Invalid user ID");
}

#[actix_web::test]
async fn test_credit_when_database_is_down() {
	let sink = RecordingSink::new();
	let app = test::init_service(App::new().configure(wiring(unreachable_pool(), sink.clone()))).await;

	let resp = test::TestRequest::post()
		.uri("/api/v1/wallet/12/credit")
		.set_json(&TestFixtures::credit(10))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	let body: ApiResponse<Empty> = test::read_body_json(resp).await;
	assert_eq!(body.message, "Credit failed");
	assert!(body.status_message.starts_with("Unable to acquire a database connection"));
	assert!(sink.contains("Credit wallet failed for user ID 12"));
}
