//! End-to-end behaviour of the HTTP client against an in-process mock API.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use parking_lot::Mutex;
use serde_json::{Value as JsonValue, json};
use time::macros::date;
use tokio::net::TcpListener;
use url::Url;

use mbank_client::api::{
    BillCategory, CardStatus, ChangeMpin, GenerateQr, MoneyRequestStatus, NewBeneficiary,
    NewMoneyRequest, NotificationKind, OtpType, PayBill, QrType, SendMoney,
};
use mbank_client::error::{
    MALFORMED_RESPONSE_MESSAGE, NOT_SIGNED_IN_MESSAGE, TIMEOUT_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
};
use mbank_client::types::{
    BeneficiaryId, BillPaymentId, CardId, MoneyRequestId, NotificationId, QrPaymentId,
    SavedBillerId, TransactionId,
};
use mbank_client::{
    Amount, BankClient, ClientConfig, Credentials, Error, KycStatus, MemoryStorage, Mpin, Storage,
    UserId,
};

const MOBILE: &str = "9876543210";
const MPIN: &str = "123456";

fn jwt_expiring_in(secs: i64) -> String {
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + secs;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "7", "exp": exp }).to_string());
    format!("{header}.{payload}.signature")
}

fn mpin() -> Mpin {
    MPIN.parse().unwrap()
}

/// One request seen by the catch-all route.
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    body: JsonValue,
}

#[derive(Default)]
struct MockApi {
    token: String,
    transfers: AtomicUsize,
    last_login: Mutex<Option<JsonValue>>,
    last_transfer: Mutex<Option<JsonValue>>,
    last_statement_query: Mutex<Option<HashMap<String, String>>>,
    recorded: Mutex<Vec<Recorded>>,
}

impl MockApi {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {}", self.token))
    }

    fn last_request(&self) -> Recorded {
        self.recorded.lock().last().cloned().unwrap()
    }
}

type Shared = Arc<MockApi>;

fn ok(data: JsonValue) -> Response {
    Json(json!({ "success": true, "message": "OK", "data": data })).into_response()
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn user_json() -> JsonValue {
    json!({
        "userId": 7,
        "customerId": "CUST0007",
        "fullName": "Asha Rao",
        "email": "asha@example.com",
        "mobileNumber": MOBILE,
        "accountStatus": "ACTIVE",
        "kycStatus": "VERIFIED",
        "biometricEnabled": false
    })
}

fn beneficiary_json(favorite: bool) -> JsonValue {
    json!({
        "beneficiaryId": 5, "beneficiaryName": "Ravi Kumar", "accountNumber": "123456789012",
        "ifscCode": "HDFC0001234", "bankName": "HDFC Bank", "branchName": "Pune",
        "mobileNumber": null, "email": null, "nickname": "Ravi", "isVerified": true,
        "isFavorite": favorite, "beneficiaryType": "BANK", "lastTransactionDate": null,
        "totalTransactions": 3, "totalAmount": 4500.0, "createdAt": "2026-09-01T08:00:00"
    })
}

fn money_request_json(status: &str, transaction_id: JsonValue) -> JsonValue {
    json!({
        "requestId": 8, "requesterId": 9, "requesterName": "Ravi", "requesterMobile": "9123456789",
        "requesteeId": 7, "requesteeName": "Asha Rao", "requesteeMobile": MOBILE,
        "amount": 250.0, "description": "Dinner", "status": status,
        "transactionId": transaction_id, "createdAt": "2026-10-01T09:30:00",
        "updatedAt": "2026-10-01T09:30:00", "expiresAt": "2026-10-08T09:30:00",
        "requestType": "RECEIVED"
    })
}

fn biller_json() -> JsonValue {
    json!({
        "billerId": 2, "billerName": "MSEB", "billerCategory": "ELECTRICITY",
        "billerCode": "MSEB01", "billerLogo": null, "convenienceFee": 0,
        "consumerNumberLabel": "Consumer No", "consumerNumberRegex": null, "isActive": true,
        "supportsFetchBill": false, "minAmount": 10.0, "maxAmount": 50000.0
    })
}

fn bill_payment_json() -> JsonValue {
    json!({
        "paymentId": 31, "billerId": 2, "billerName": "MSEB", "billerCategory": "ELECTRICITY",
        "consumerNumber": "CN12345", "amount": 640.5, "paymentStatus": "SUCCESS",
        "transactionId": 77, "billMonth": "SEPTEMBER", "billYear": 2026, "dueDate": null,
        "paidDate": "2026-10-02T11:00:00", "referenceNumber": "BILL31",
        "confirmationNumber": "CNF31", "paymentMode": "ACCOUNT", "remarks": null,
        "createdAt": "2026-10-02T11:00:00"
    })
}

fn card_json(status: &str, primary: bool) -> JsonValue {
    json!({
        "cardId": 12, "cardNumber": "**** **** **** 4242", "cardType": "DEBIT",
        "cardHolderName": "ASHA RAO", "expiryDate": "08/29", "cardStatus": status,
        "isPrimary": primary, "dailyLimit": 25000.0, "monthlyLimit": 200000.0,
        "atmEnabled": true, "onlineEnabled": true, "contactlessEnabled": false,
        "internationalEnabled": false, "issuedDate": "2024-08-01T00:00:00",
        "lastUsedDate": null, "cardBrand": "RUPAY"
    })
}

fn qr_json() -> JsonValue {
    json!({
        "qrPaymentId": 12, "qrCode": "QR-7-12", "qrType": "RECEIVE", "amount": 150.0,
        "merchantName": null, "merchantUpi": null, "accountNumber": "1234567890123456",
        "ifscCode": "MBNK0000001", "transactionId": null, "paymentStatus": "PENDING",
        "qrData": "mbank://pay?qr=QR-7-12", "isExpired": false,
        "expiresAt": "2099-01-01T00:00:00", "createdAt": "2026-10-18T10:00:00",
        "completedAt": null
    })
}

fn notification_json() -> JsonValue {
    json!({
        "notificationId": 4, "notificationType": "SECURITY", "title": "New login",
        "message": "Signed in on a new device", "referenceId": null, "referenceType": null,
        "isRead": false, "priority": "HIGH", "actionUrl": null, "icon": "security",
        "createdAt": "2026-10-18T10:00:00", "readAt": null
    })
}

fn profile_json() -> JsonValue {
    json!({
        "userId": 7, "customerId": "CUST0007", "fullName": "Asha Rao", "mobileNumber": MOBILE,
        "email": "asha@example.com", "dateOfBirth": "1990-05-01", "gender": "FEMALE",
        "address": "12 MG Road", "city": "Pune", "state": "Maharashtra", "pincode": "411001",
        "kycStatus": "VERIFIED", "accountStatus": "ACTIVE", "profileImagePath": null
    })
}

/// Canned `data` for the feature endpoints the catch-all route serves.
fn canned(method: &str, path: &str) -> Option<JsonValue> {
    let data = match (method, path) {
        ("POST", "/api/auth/send-otp" | "/api/auth/verify-otp") => JsonValue::Null,
        ("POST", "/api/beneficiaries/add") => beneficiary_json(false),
        ("GET", "/api/beneficiaries/search") => json!([beneficiary_json(false)]),
        ("PUT", "/api/beneficiaries/5/toggle-favorite") => beneficiary_json(true),
        ("POST", "/api/money-requests/create") => {
            let mut sent = money_request_json("PENDING", JsonValue::Null);
            sent["requestType"] = json!("SENT");
            sent
        }
        ("GET", "/api/money-requests/pending") => {
            json!([money_request_json("PENDING", JsonValue::Null)])
        }
        ("POST", "/api/money-requests/8/accept") => money_request_json("ACCEPTED", json!(99)),
        ("GET", "/api/bills/billers/category/ELECTRICITY") => json!([biller_json()]),
        ("POST", "/api/bills/pay") => bill_payment_json(),
        ("DELETE", "/api/bills/saved/3") => JsonValue::Null,
        ("GET", "/api/bills/history/31") => bill_payment_json(),
        ("GET", "/api/cards/active") => json!([card_json("ACTIVE", false)]),
        ("PUT", "/api/cards/12/set-primary") => card_json("ACTIVE", true),
        ("PUT", "/api/cards/12/status") => card_json("BLOCKED", false),
        ("POST", "/api/qr-payments/generate") => qr_json(),
        ("GET", "/api/qr-payments/active") => json!([qr_json()]),
        ("GET", "/api/qr-payments/12") => qr_json(),
        ("GET", "/api/notifications/type/SECURITY") => json!([notification_json()]),
        ("PUT", "/api/notifications/4/read") => JsonValue::Null,
        ("DELETE", "/api/notifications/clear-all") => JsonValue::Null,
        ("GET", "/api/users/profile") => profile_json(),
        ("POST", "/api/users/change-mpin") => json!("MPIN changed successfully"),
        _ => return None,
    };
    Some(data)
}

async fn catch_all(
    State(api): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    if !path.starts_with("/api/auth/") && !api.authorized(&headers) {
        return rejected(StatusCode::UNAUTHORIZED, "");
    }
    api.recorded.lock().push(Recorded {
        method: method.as_str().to_owned(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        body: serde_json::from_slice(&body).unwrap_or(JsonValue::Null),
    });
    match canned(method.as_str(), &path) {
        Some(data) => ok(data),
        None => rejected(StatusCode::NOT_FOUND, "No such endpoint"),
    }
}

async fn login(State(api): State<Shared>, Json(body): Json<JsonValue>) -> Response {
    *api.last_login.lock() = Some(body.clone());
    if body["mobileNumber"] == MOBILE && body["mpin"] == MPIN {
        ok(json!({
            "accessToken": api.token,
            "refreshToken": "refresh-1",
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "user": user_json(),
            "account": {
                "accountId": 3, "accountNumber": "1234567890123456",
                "accountType": "SAVINGS", "balance": 1000.0, "accountStatus": "ACTIVE"
            }
        }))
    } else {
        rejected(StatusCode::UNAUTHORIZED, "Invalid mobile number or MPIN")
    }
}

async fn account(State(api): State<Shared>, headers: HeaderMap) -> Response {
    if !api.authorized(&headers) {
        return rejected(StatusCode::UNAUTHORIZED, "");
    }
    ok(json!({
        "accountId": 3,
        "accountNumber": "1234567890123456",
        "accountType": "SAVINGS",
        "balance": 1000.0,
        "availableBalance": 900.0,
        "currency": "INR",
        "accountStatus": "ACTIVE",
        "ifscCode": "MBNK0000001",
        "branchName": "Pune Main"
    }))
}

async fn recent_transactions() -> Response {
    rejected(StatusCode::UNAUTHORIZED, "Token revoked")
}

async fn send_money(State(api): State<Shared>, Json(body): Json<JsonValue>) -> Response {
    api.transfers.fetch_add(1, Ordering::SeqCst);
    *api.last_transfer.lock() = Some(body.clone());
    ok(json!({
        "transactionId": 41,
        "transactionRef": "TXN0000041",
        "transactionType": "TRANSFER_OUT",
        "amount": body["amount"],
        "description": body["description"],
        "status": "SUCCESS",
        "createdAt": "2026-10-18T10:00:00.123",
        "fromAccountNumber": "1234567890123456",
        "toAccountNumber": body["toAccountNumber"]
    }))
}

async fn statement(
    State(api): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *api.last_statement_query.lock() = Some(query);
    ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.4 statement".to_vec()).into_response()
}

async fn cards() -> Response {
    Json(json!({
        "success": false,
        "message": "Cards service is down for maintenance",
        "errorCode": "MAINTENANCE",
        "data": { "ignored": true }
    }))
    .into_response()
}

async fn notifications() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

async fn bill_history() -> Response {
    ([(header::CONTENT_TYPE, "text/html")], "<html>gateway</html>").into_response()
}

async fn qr_history() -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    ok(json!([]))
}

async fn spawn_mock() -> (Url, Shared) {
    let api = Arc::new(MockApi {
        token: jwt_expiring_in(3600),
        ..MockApi::default()
    });
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/accounts/me", get(account))
        .route("/api/accounts/statement/download", get(statement))
        .route("/api/accounts/transactions/recent", get(recent_transactions))
        .route("/api/accounts/transactions/send-money", post(send_money))
        .route("/api/cards/all", get(cards))
        .route("/api/notifications/all", get(notifications))
        .route("/api/bills/history", get(bill_history))
        .route("/api/qr-payments/history", get(qr_history))
        .fallback(catch_all)
        .with_state(Arc::clone(&api));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api").parse().unwrap(), api)
}

fn client_for(base_url: Url, storage: Arc<MemoryStorage>) -> BankClient<Arc<MemoryStorage>> {
    let config = ClientConfig::new(base_url).with_timeout(Duration::from_millis(500));
    BankClient::new(config, storage).unwrap()
}

async fn signed_in() -> (BankClient<Arc<MemoryStorage>>, Arc<MemoryStorage>, Shared) {
    let (url, api) = spawn_mock().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_for(url, Arc::clone(&storage));
    client
        .login(&Credentials::parse(MOBILE, MPIN).unwrap())
        .await
        .unwrap();
    (client, storage, api)
}

#[tokio::test]
async fn login_populates_session_and_notifies() {
    let (url, api) = spawn_mock().await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_for(url, Arc::clone(&storage));
    let mut users = client.subscribe();
    assert!(users.borrow_and_update().is_none());

    let session = client
        .login(&Credentials::parse(MOBILE, MPIN).unwrap())
        .await
        .unwrap();

    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert!(client.is_authenticated());
    assert!(users.has_changed().unwrap());
    let user = users.borrow_and_update().clone().unwrap();
    assert_eq!(user.mobile_number.as_str(), MOBILE);
    assert_eq!(user.full_name, "Asha Rao");
    assert_eq!(user.user_id, UserId::from("7"));
    assert_eq!(user.customer_id.as_deref(), Some("CUST0007"));
    assert_eq!(user.kyc_status, KycStatus::Verified);
    assert!(user.is_active());

    assert!(storage.has("bank_auth_token"));
    assert!(storage.has("bank_refresh_token"));
    assert!(storage.has("currentUser"));
    assert!(storage.has("deviceId"));
    let body = api.last_login.lock().clone().unwrap();
    assert_eq!(body["deviceId"].as_str().unwrap().len(), 26);
    assert!(matches!(body["deviceType"].as_str(), Some("MOBILE" | "DESKTOP")));
    assert!(body["osType"].is_string());
}

#[tokio::test]
async fn rejected_login_keeps_server_message() {
    let (url, _api) = spawn_mock().await;
    let client = client_for(url, Arc::new(MemoryStorage::new()));

    let err = client
        .login(&Credentials::parse(MOBILE, "999999").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid mobile number or MPIN");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn session_survives_restart() {
    let (url, _api) = spawn_mock().await;
    let storage = Arc::new(MemoryStorage::new());
    let first = client_for(url.clone(), Arc::clone(&storage));
    first
        .login(&Credentials::parse(MOBILE, MPIN).unwrap())
        .await
        .unwrap();
    let device_id = first.session().device_id();
    drop(first);

    let second = client_for(url, storage);
    assert!(second.is_authenticated());
    assert_eq!(second.current_user().unwrap().full_name, "Asha Rao");
    assert_eq!(second.session().device_id(), device_id);
    assert!(second.accounts().account().await.is_ok());
}

#[tokio::test]
async fn authenticated_call_sends_bearer_token() {
    let (client, _storage, _api) = signed_in().await;

    let account = client.accounts().account().await.unwrap();

    assert_eq!(account.balance, Amount::from_minor(100_000));
    assert_eq!(account.spendable(), Amount::from_minor(90_000));
    assert_eq!(account.account_number, "1234567890123456");
}

#[tokio::test]
async fn calls_without_session_fail_locally() {
    let (url, _api) = spawn_mock().await;
    let client = client_for(url, Arc::new(MemoryStorage::new()));

    let err = client.accounts().account().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), NOT_SIGNED_IN_MESSAGE);
}

#[tokio::test]
async fn failed_envelope_surfaces_message_and_code() {
    let (client, _storage, _api) = signed_in().await;

    let err = client.cards().list().await.unwrap_err();

    assert_eq!(err.to_string(), "Cards service is down for maintenance");
    assert_eq!(err.error_code(), Some("MAINTENANCE"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn server_error_without_body_gets_generic_message() {
    let (client, _storage, _api) = signed_in().await;

    let err = client.notifications().list().await.unwrap_err();

    match err {
        Error::Api { status, .. } => assert_eq!(status, Some(503)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn non_envelope_success_body_is_transport_error() {
    let (client, _storage, _api) = signed_in().await;

    let err = client.bills().history().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.to_string(), MALFORMED_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn unauthorized_response_forces_logout() {
    let (client, storage, _api) = signed_in().await;
    let mut users = client.subscribe();
    users.borrow_and_update();

    let err = client.accounts().recent_transactions().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Token revoked");
    assert!(!client.is_authenticated());
    assert!(users.has_changed().unwrap());
    assert!(users.borrow_and_update().is_none());
    assert!(!storage.has("bank_auth_token"));
    assert!(!storage.has("currentUser"));
    assert!(storage.has("deviceId"));
}

#[tokio::test]
async fn over_balance_transfer_never_reaches_server() {
    let (client, _storage, api) = signed_in().await;
    let too_much = SendMoney::new(
        "1234567890123456",
        "250.00".parse().unwrap(),
        "Rent share",
        mpin(),
    )
    .unwrap();
    let err = client
        .accounts()
        .send_money(&too_much, Amount::from_minor(10_000))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Insufficient balance");
    assert_eq!(api.transfers.load(Ordering::SeqCst), 0);

    let transaction = client
        .accounts()
        .send_money(&too_much, Amount::from_minor(100_000))
        .await
        .unwrap();
    assert_eq!(transaction.transaction_id, TransactionId::from("41"));
    assert_eq!(transaction.transaction_ref.as_deref(), Some("TXN0000041"));
    assert_eq!(transaction.amount, Amount::from_minor(25_000));
    assert!(!transaction.transaction_type.is_credit());
    assert_eq!(api.transfers.load(Ordering::SeqCst), 1);
    assert_eq!(
        api.last_transfer.lock().clone().unwrap(),
        json!({
            "toAccountNumber": "1234567890123456",
            "amount": 250.0,
            "description": "Rent share",
            "mpin": MPIN
        })
    );
}

#[tokio::test]
async fn statement_download_returns_raw_bytes() {
    let (client, _storage, api) = signed_in().await;

    let bytes = client
        .accounts()
        .download_statement(date!(2026 - 09 - 01), date!(2026 - 09 - 30))
        .await
        .unwrap();

    assert_eq!(bytes, b"%PDF-1.4 statement");
    let query = api.last_statement_query.lock().clone().unwrap();
    assert_eq!(query["startDate"], "2026-09-01");
    assert_eq!(query["endDate"], "2026-09-30");
    assert_eq!(query.len(), 2);
}

#[tokio::test]
async fn slow_response_times_out() {
    let (client, _storage, _api) = signed_in().await;

    let err = client.qr_payments().history().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.to_string(), TIMEOUT_MESSAGE);
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = client_for(
        "http://127.0.0.1:1/api/".parse().unwrap(),
        Arc::new(MemoryStorage::new()),
    );

    let err = client
        .login(&Credentials::parse(MOBILE, MPIN).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.to_string(), TRANSPORT_FAILURE_MESSAGE);
}

#[tokio::test]
async fn otp_calls_use_code_and_type() {
    let (url, api) = spawn_mock().await;
    let client = client_for(url, Arc::new(MemoryStorage::new()));
    let mobile = MOBILE.parse().unwrap();

    client
        .api()
        .send_otp(&mobile, Some("asha@example.com"), OtpType::Registration)
        .await
        .unwrap();
    let sent = api.last_request();
    assert_eq!((sent.method.as_str(), sent.path.as_str()), ("POST", "/api/auth/send-otp"));
    assert_eq!(
        sent.body,
        json!({ "mobileNumber": MOBILE, "email": "asha@example.com", "otpType": "REGISTRATION" })
    );

    client
        .api()
        .verify_otp(&mobile, &"482913".parse().unwrap(), OtpType::Registration)
        .await
        .unwrap();
    let checked = api.last_request();
    assert_eq!(checked.path, "/api/auth/verify-otp");
    assert_eq!(
        checked.body,
        json!({ "mobileNumber": MOBILE, "otpCode": "482913", "otpType": "REGISTRATION" })
    );
}

#[tokio::test]
async fn beneficiary_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let beneficiaries = client.beneficiaries();

    let new = NewBeneficiary::new("Ravi Kumar", "123456789012", "HDFC0001234".parse().unwrap())
        .unwrap()
        .with_nickname("Ravi");
    let added = beneficiaries.add(&new).await.unwrap();
    assert_eq!(added.beneficiary_id, BeneficiaryId::from("5"));
    assert_eq!(added.label(), "Ravi");
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/beneficiaries/add"));
    assert_eq!(request.body["beneficiaryName"], "Ravi Kumar");
    assert_eq!(request.body["ifscCode"], "HDFC0001234");
    assert_eq!(request.body["beneficiaryType"], "BANK");

    let found = beneficiaries.search(" ravi ").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(api.last_request().query.as_deref(), Some("q=ravi"));

    let toggled = beneficiaries.toggle_favorite(&added.beneficiary_id).await.unwrap();
    assert!(toggled.is_favorite);
    let request = api.last_request();
    assert_eq!(
        (request.method.as_str(), request.path.as_str()),
        ("PUT", "/api/beneficiaries/5/toggle-favorite")
    );
}

#[tokio::test]
async fn money_request_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let requests = client.money_requests();

    let new = NewMoneyRequest::new("9123456789".parse().unwrap(), Amount::from_minor(25_000), "Dinner")
        .unwrap();
    let created = requests.create(&new).await.unwrap();
    assert!(created.status.is_open());
    let request = api.last_request();
    assert_eq!(request.path, "/api/money-requests/create");
    assert_eq!(
        request.body,
        json!({ "requesteeMobile": "9123456789", "amount": 250.0, "description": "Dinner" })
    );

    let pending = requests.pending().await.unwrap();
    assert_eq!(pending[0].request_id, MoneyRequestId::from("8"));
    assert_eq!(api.last_request().path, "/api/money-requests/pending");

    let accepted = requests.accept(&pending[0].request_id, &mpin()).await.unwrap();
    assert_eq!(accepted.status, MoneyRequestStatus::Accepted);
    assert_eq!(accepted.transaction_id, Some(TransactionId::from("99")));
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/money-requests/8/accept"));
    assert_eq!(request.body, json!({ "mpin": MPIN }));
}

#[tokio::test]
async fn bill_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let bills = client.bills();

    let billers = bills.billers_by_category(BillCategory::Electricity).await.unwrap();
    assert_eq!(api.last_request().path, "/api/bills/billers/category/ELECTRICITY");
    let biller = &billers[0];
    assert_eq!(biller.min_amount, Some(Amount::from_minor(1_000)));

    let payment = PayBill::new(biller, "CN12345", Amount::from_minor(64_050), mpin())
        .unwrap()
        .for_period("SEPTEMBER", 2026);
    let paid = bills.pay(&payment, Amount::from_minor(100_000)).await.unwrap();
    assert_eq!(paid.payment_id, BillPaymentId::from("31"));
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/bills/pay"));
    assert_eq!(request.body["billerId"], "2");
    assert_eq!(request.body["consumerNumber"], "CN12345");
    assert_eq!(request.body["billMonth"], "SEPTEMBER");
    assert_eq!(request.body["mpin"], MPIN);

    bills.remove_saved_biller(&SavedBillerId::from("3")).await.unwrap();
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("DELETE", "/api/bills/saved/3"));

    let fetched = bills.payment(&paid.payment_id).await.unwrap();
    assert_eq!(fetched.confirmation_number.as_deref(), Some("CNF31"));
    assert_eq!(api.last_request().path, "/api/bills/history/31");
}

#[tokio::test]
async fn card_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let cards = client.cards();

    let active = cards.active().await.unwrap();
    assert_eq!(active[0].card_id, CardId::from("12"));
    assert_eq!(api.last_request().path, "/api/cards/active");

    let primary = cards.set_primary(&active[0].card_id).await.unwrap();
    assert!(primary.is_primary);
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("PUT", "/api/cards/12/set-primary"));

    let blocked = cards.set_status(&active[0].card_id, CardStatus::Blocked).await.unwrap();
    assert_eq!(blocked.card_status, CardStatus::Blocked);
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("PUT", "/api/cards/12/status"));
    assert_eq!(request.body, json!({ "status": "BLOCKED" }));
}

#[tokio::test]
async fn qr_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let qr = client.qr_payments();

    let generated = qr
        .generate(&GenerateQr::receive().with_amount(Amount::from_minor(15_000)).unwrap())
        .await
        .unwrap();
    assert_eq!(generated.qr_type, QrType::Receive);
    assert_eq!(generated.amount, Some(Amount::from_minor(15_000)));
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/qr-payments/generate"));
    assert_eq!(
        request.body,
        json!({ "qrType": "RECEIVE", "amount": 150.0, "expiryMinutes": 30 })
    );

    let active = qr.active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(api.last_request().path, "/api/qr-payments/active");

    let fetched = qr.get(&QrPaymentId::from("12")).await.unwrap();
    assert_eq!(fetched.qr_code, "QR-7-12");
    assert!(fetched.is_payable_at(time::OffsetDateTime::now_utc()));
    assert_eq!(api.last_request().path, "/api/qr-payments/12");
}

#[tokio::test]
async fn notification_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let notifications = client.notifications();

    let security = notifications.by_kind(NotificationKind::Security).await.unwrap();
    assert_eq!(security[0].kind, NotificationKind::Security);
    assert_eq!(api.last_request().path, "/api/notifications/type/SECURITY");

    notifications.mark_read(&NotificationId::from("4")).await.unwrap();
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("PUT", "/api/notifications/4/read"));

    notifications.clear_all().await.unwrap();
    let request = api.last_request();
    assert_eq!(
        (request.method.as_str(), request.path.as_str()),
        ("DELETE", "/api/notifications/clear-all")
    );
}

#[tokio::test]
async fn user_endpoints() {
    let (client, _storage, api) = signed_in().await;
    let users = client.users();

    let profile = users.profile().await.unwrap();
    assert_eq!(profile.user_id, UserId::from("7"));
    assert_eq!(profile.customer_id.as_deref(), Some("CUST0007"));
    assert_eq!(profile.city.as_deref(), Some("Pune"));
    assert_eq!(api.last_request().path, "/api/users/profile");

    let change = ChangeMpin::new(mpin(), "654321".parse().unwrap()).unwrap();
    let message = users.change_mpin(&change).await.unwrap();
    assert_eq!(message, "MPIN changed successfully");
    let request = api.last_request();
    assert_eq!((request.method.as_str(), request.path.as_str()), ("POST", "/api/users/change-mpin"));
    assert_eq!(request.body, json!({ "currentMpin": MPIN, "newMpin": "654321" }));
}
