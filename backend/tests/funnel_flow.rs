//! End-to-end funnel and lead flows through the HTTP handlers, the domain
//! services, and the in-memory ERP.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crm_bff::Trace;
use crm_bff::domain::ports::{FunnelsCommand, LeadsCommand};
use crm_bff::domain::schema::{FUNNEL_PERMISSIONS, FUNNELS, LEADS};
use crm_bff::domain::{FunnelService, LeadDraft, LeadService, ReadAfterWrite};
use crm_bff::inbound::http::funnels::{list_funnels, save_funnel};
use crm_bff::inbound::http::json_config;
use crm_bff::inbound::http::leads::list_leads;
use crm_bff::inbound::http::state::HttpState;
use crm_bff::test_support::{FixedClock, InMemoryErpGateway};

const ADMIN: &str = r#"user={"id":1,"name":"Root","role":"Administrador"}"#;
const SELLER: &str = r#"user={"id":"7","name":"Ana","role":"Vendedor"}"#;

struct World {
    erp: Arc<InMemoryErpGateway>,
    funnels: Arc<FunnelService>,
    leads: Arc<LeadService>,
}

#[fixture]
fn world() -> World {
    let erp = Arc::new(InMemoryErpGateway::new());
    let clock = Arc::new(FixedClock::on(2026, 10, 16));
    let funnels = Arc::new(
        FunnelService::new(erp.clone(), clock.clone())
            .with_read_after_write(ReadAfterWrite::immediate()),
    );
    let leads = Arc::new(
        LeadService::new(erp.clone(), clock).with_read_after_write(ReadAfterWrite::immediate()),
    );
    World {
        erp,
        funnels,
        leads,
    }
}

async fn call(world: &World, request: test::TestRequest) -> actix_web::dev::ServiceResponse {
    let state = HttpState::new(
        world.funnels.clone(),
        world.funnels.clone(),
        world.leads.clone(),
    );
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .wrap(Trace)
            .service(list_funnels)
            .service(save_funnel)
            .service(list_leads),
    )
    .await;
    test::call_service(&app, request.to_request()).await
}

fn as_array(body: &Value) -> &[Value] {
    body.as_array().map(Vec::as_slice).unwrap_or_default()
}

#[rstest]
#[actix_web::test]
async fn saved_funnel_is_listed_for_admin(world: World) {
    let saved = call(
        &world,
        test::TestRequest::post()
            .uri("/api/funis/salvar")
            .insert_header((header::COOKIE, ADMIN))
            .set_json(json!({ "NOME": "Sales", "COR": "#ff0000" })),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);

    let listed = call(
        &world,
        test::TestRequest::get()
            .uri("/api/funis")
            .insert_header((header::COOKIE, ADMIN)),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = test::read_body_json(listed).await;
    let funnels = as_array(&body);

    assert_eq!(funnels.len(), 1);
    let funnel = funnels.first().expect("one funnel");
    assert_eq!(funnel.get("NOME"), Some(&json!("Sales")));
    assert_eq!(funnel.get("COR"), Some(&json!("#ff0000")));
    assert_eq!(funnel.get("ATIVO"), Some(&json!("S")));
    assert_eq!(funnel.get("DATA_CRIACAO"), Some(&json!("16/10/2026")));
    assert_eq!(funnel.get("DATA_ATUALIZACAO"), Some(&json!("16/10/2026")));
}

#[rstest]
#[actix_web::test]
async fn seller_sees_only_granted_funnels(world: World) {
    let granted = world.erp.seed(&FUNNELS, &[("NOME", "Granted"), ("ATIVO", "S")]);
    world.erp.seed(&FUNNELS, &[("NOME", "Hidden"), ("ATIVO", "S")]);
    world
        .funnels
        .assign_funnel(&granted, 7)
        .await
        .expect("grant");

    let res = call(
        &world,
        test::TestRequest::get()
            .uri("/api/funis")
            .insert_header((header::COOKIE, SELLER)),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let names: Vec<_> = as_array(&body)
        .iter()
        .filter_map(|funnel| funnel.get("NOME").and_then(Value::as_str))
        .collect();

    assert_eq!(names, ["Granted"]);
    assert_eq!(world.erp.load_count(&FUNNEL_PERMISSIONS), 1);
}

#[rstest]
#[actix_web::test]
async fn seller_without_grants_triggers_no_funnel_query(world: World) {
    world.erp.seed(&FUNNELS, &[("NOME", "Sales"), ("ATIVO", "S")]);

    let res = call(
        &world,
        test::TestRequest::get()
            .uri("/api/funis")
            .insert_header((header::COOKIE, SELLER)),
    )
    .await;
    let body: Value = test::read_body_json(res).await;

    assert!(as_array(&body).is_empty());
    assert_eq!(world.erp.load_count(&FUNNELS), 0);
}

#[rstest]
#[actix_web::test]
async fn created_lead_is_listed_for_owner_with_no_store(world: World) {
    world
        .leads
        .save_lead(
            LeadDraft {
                name: Some("Acme".into()),
                value: Some(1200.0),
                due_date: Some("2026-12-31".into()),
                ..LeadDraft::default()
            },
            Some(7),
        )
        .await
        .expect("create lead");
    world.erp.seed(&LEADS, &[("NOME", "Other"), ("ATIVO", "S"), ("CODUSUARIO", "8")]);

    let res = call(
        &world,
        test::TestRequest::get()
            .uri("/api/leads")
            .insert_header((header::COOKIE, SELLER)),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );
    let body: Value = test::read_body_json(res).await;
    let leads = as_array(&body);
    assert_eq!(leads.len(), 1);
    let lead = leads.first().expect("one lead");
    assert_eq!(lead.get("NOME"), Some(&json!("Acme")));
    assert_eq!(lead.get("STATUS_LEAD"), Some(&json!("EM_ANDAMENTO")));
    assert_eq!(lead.get("DATA_VENCIMENTO"), Some(&json!("31/12/2026")));
}

#[rstest]
#[actix_web::test]
async fn deleted_funnel_disappears_from_listing(world: World) {
    let id = world.erp.seed(&FUNNELS, &[("NOME", "Sales"), ("ATIVO", "S")]);
    world.funnels.delete_funnel(&id).await.expect("delete");

    let res = call(
        &world,
        test::TestRequest::get()
            .uri("/api/funis")
            .insert_header((header::COOKIE, ADMIN)),
    )
    .await;
    let body: Value = test::read_body_json(res).await;

    assert!(as_array(&body).is_empty());
    assert_eq!(world.erp.rows(&FUNNELS).len(), 1, "soft delete keeps the row");
}
