use actix_web::{http::StatusCode, test, App};
use bigdecimal::BigDecimal;
use futures::future::join_all;

use crate::{
	models::{ApiResponse, Empty, Wallet},
	tests::{
		fixtures::TestFixtures,
		test_utils::{balance_of, clear_wallet, live_pool, random_user_id, wiring, RecordingSink},
	},
};

#[actix_web::test]
#[ignore = "needs a running Postgres (DATABASE_URL or DB_*)"]
async fn test_complete_wallet_flow() {
	let pool = live_pool();
	let user_id = random_user_id();
	clear_wallet(&pool, user_id);
	let sink = RecordingSink::new();
	let app = test::init_service(App::new().configure(wiring(pool.clone(), sink.clone()))).await;

	// Step 1: no wallet yet
	let resp = test::TestRequest::get()
		.uri(&format!("/api/v1/wallet/{}", user_id))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	let body: ApiResponse<Empty> = test::read_body_json(resp).await;
	assert_eq!(body.message, "Wallet not found");

	// Step 2: debit on a missing wallet fails
	let resp = test::TestRequest::post()
		.uri(&format!("/api/v1/wallet/{}/debit", user_id))
		.set_json(&TestFixtures::credit(5))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	let body: ApiResponse<Empty> = test::read_body_json(resp).await;
	assert_eq!(body.message, "Debit failed");
	assert_eq!(body.status_message, "Wallet not found");

	// Step 3: first credit creates the wallet
	let resp = test::TestRequest::post()
		.uri(&format!("/api/v1/wallet/{}/credit", user_id))
		.set_json(&TestFixtures::credit(50))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK, "Credit failed");
	let body: ApiResponse<Wallet> = test::read_body_json(resp).await;
	assert_eq!(body.message, "Amount credited successfully");
	assert_eq!(body.data.balance, BigDecimal::from(50));

	// Step 4: debit within balance
	let resp = test::TestRequest::post()
		.uri(&format!("/api/v1/wallet/{}/debit", user_id))
		.set_json(&TestFixtures::amount(serde_json::json!("20")))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK, "Debit failed");

	// Step 5: overdraw is refused
	let resp = test::TestRequest::post()
		.uri(&format!("/api/v1/wallet/{}/debit", user_id))
		.set_json(&TestFixtures::credit(100))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	let body: ApiResponse<Empty> = test::read_body_json(resp).await;
	assert_eq!(body.status_message, "Insufficient funds");

	// Step 6: final balance
	let resp = test::TestRequest::get()
		.uri(&format!("/api/v1/wallet/{}", user_id))
		.send_request(&app)
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
	let body: ApiResponse<Wallet> = test::read_body_json(resp).await;
	assert_eq!(body.data.balance, BigDecimal::from(30), "Final balance is incorrect");
}

#[actix_web::test]
#[ignore = "needs a running Postgres (DATABASE_URL or DB_*)"]
async fn test_concurrent_credit_requests() {
	let pool = live_pool();
	let user_id = random_user_id();
	clear_wallet(&pool, user_id);
	let app =
		test::init_service(App::new().configure(wiring(pool.clone(), RecordingSink::new()))).await;

	let uri = format!("/api/v1/wallet/{}/credit", user_id);
	let requests = (0..20).map(|_| {
		test::TestRequest::post().uri(&uri).set_json(&TestFixtures::credit(3)).send_request(&app)
	});
	let responses = join_all(requests).await;

	assert!(responses.iter().all(|r| r.status() == StatusCode::OK));
	assert_eq!(balance_of(&pool, user_id), Some(BigDecimal::from(60)));
}
