use actix_web::{test, test::TestRequest, web, App};
use lm_common::Secret;
use serde_json::Value;

use crate::{
    preview::{PreviewTokenSigner, DEFAULT_PREVIEW_MAX_AGE_SECONDS},
    routes::preview_token,
};

fn signer() -> PreviewTokenSigner {
    PreviewTokenSigner::new(Secret::new("endpoint_test_secret".to_string()))
}

#[actix_web::test]
async fn issued_token_verifies_for_the_same_slug() {
    let app = App::new().app_data(web::Data::new(signer())).service(preview_token);
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri("/preview-token/widget-1").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = test::read_body_json(res).await;
    let token = body["preview"].as_str().expect("response must carry a preview token");
    let slug = signer().verify(token, DEFAULT_PREVIEW_MAX_AGE_SECONDS).expect("fresh token must verify");
    assert_eq!(slug, "widget-1");
}
