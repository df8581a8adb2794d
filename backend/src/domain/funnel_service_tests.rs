//! Tests for the funnel service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::funnels::DEFAULT_COLOR;
use crate::domain::ports::{ErpGatewayError, MockErpGateway, SaveOutcome};
use crate::domain::schema::ErpRecord;
use crate::test_support::{FixedClock, InMemoryErpGateway};

#[fixture]
fn erp() -> Arc<InMemoryErpGateway> {
    Arc::new(InMemoryErpGateway::new())
}

fn service(erp: &Arc<InMemoryErpGateway>) -> FunnelService {
    FunnelService::new(erp.clone(), Arc::new(FixedClock::on(2026, 10, 16)))
        .with_read_after_write(ReadAfterWrite::immediate())
}

fn seed_funnel(erp: &InMemoryErpGateway, name: &str, active: &str) -> String {
    erp.seed(
        &FUNNELS,
        &[("NOME", name), ("COR", "#111111"), ("ATIVO", active)],
    )
}

fn grant(erp: &InMemoryErpGateway, funnel_id: &str, user_id: &str, active: &str) -> String {
    erp.seed(
        &FUNNEL_PERMISSIONS,
        &[("CODFUNIL", funnel_id), ("CODUSUARIO", user_id), ("ATIVO", active)],
    )
}

#[rstest]
#[tokio::test]
async fn admin_sees_every_active_funnel_without_permission_lookup(erp: Arc<InMemoryErpGateway>) {
    seed_funnel(&erp, "Sales", "S");
    seed_funnel(&erp, "Retired", "N");
    seed_funnel(&erp, "Support", "S");

    let funnels = service(&erp)
        .list_funnels(Some(4), true)
        .await
        .expect("admin listing succeeds");

    let names: Vec<_> = funnels.iter().map(|funnel| funnel.name.as_str()).collect();
    assert_eq!(names, ["Sales", "Support"]);
    assert_eq!(erp.load_count(&FUNNEL_PERMISSIONS), 0, "admins skip grants");
    let load = erp.loads().pop().expect("one funnel load");
    let criteria = load.criteria().expect("active filter");
    assert!(!criteria.references("CODUSUARIO"));
    assert!(!criteria.references("CODFUNIL"), "no permission clause for admins");
}

#[rstest]
#[tokio::test]
async fn non_admin_sees_only_granted_active_funnels(erp: Arc<InMemoryErpGateway>) {
    let sales = seed_funnel(&erp, "Sales", "S");
    let support = seed_funnel(&erp, "Support", "S");
    let retired = seed_funnel(&erp, "Retired", "N");
    seed_funnel(&erp, "Hidden", "S");
    grant(&erp, &sales, "7", "S");
    grant(&erp, &retired, "7", "S");
    grant(&erp, &support, "7", "N");
    grant(&erp, &support, "8", "S");

    let funnels = service(&erp)
        .list_funnels(Some(7), false)
        .await
        .expect("listing succeeds");

    let names: Vec<_> = funnels.iter().map(|funnel| funnel.name.as_str()).collect();
    assert_eq!(names, ["Sales"]);
}

#[rstest]
#[tokio::test]
async fn non_admin_without_grants_skips_detail_query(erp: Arc<InMemoryErpGateway>) {
    seed_funnel(&erp, "Sales", "S");

    let funnels = service(&erp)
        .list_funnels(Some(99), false)
        .await
        .expect("listing succeeds");

    assert!(funnels.is_empty());
    assert_eq!(erp.load_count(&FUNNEL_PERMISSIONS), 1);
    assert_eq!(erp.load_count(&FUNNELS), 0, "detail query must not run");
}

#[rstest]
#[tokio::test]
async fn non_admin_without_user_id_issues_no_query() {
    let mut gateway = MockErpGateway::new();
    gateway.expect_load().never();
    let service = FunnelService::new(Arc::new(gateway), Arc::new(FixedClock::on(2026, 1, 1)));

    let funnels = service
        .list_funnels(None, false)
        .await
        .expect("listing succeeds");
    assert!(funnels.is_empty());
}

#[rstest]
#[tokio::test]
async fn listing_propagates_gateway_failures() {
    let mut gateway = MockErpGateway::new();
    gateway
        .expect_load()
        .times(1)
        .returning(|_| Err(ErpGatewayError::malformed_response("html page")));
    let service = FunnelService::new(Arc::new(gateway), Arc::new(FixedClock::on(2026, 1, 1)));

    let error = service
        .list_funnels(None, true)
        .await
        .expect_err("failure must surface");
    assert_eq!(error.code(), ErrorCode::UpstreamError);
}

#[rstest]
#[tokio::test]
async fn stages_are_active_and_ordered_by_rank(erp: Arc<InMemoryErpGateway>) {
    for (name, rank, active) in [("Won", "3", "S"), ("New", "1", "S"), ("Gone", "2", "N")] {
        erp.seed(
            &FUNNEL_STAGES,
            &[("CODFUNIL", "5"), ("NOME", name), ("ORDEM", rank), ("ATIVO", active)],
        );
    }
    erp.seed(
        &FUNNEL_STAGES,
        &[("CODFUNIL", "6"), ("NOME", "Other"), ("ORDEM", "0"), ("ATIVO", "S")],
    );

    let stages = service(&erp).list_stages("5").await.expect("stages load");

    let names: Vec<_> = stages.iter().map(|stage| stage.name.as_str()).collect();
    assert_eq!(names, ["New", "Won"]);
}

#[rstest]
#[tokio::test]
async fn inserting_a_funnel_stamps_flags_and_dates(erp: Arc<InMemoryErpGateway>) {
    let funnel = service(&erp)
        .save_funnel(FunnelDraft {
            name: Some("Sales".into()),
            color: Some("#ff0000".into()),
            ..FunnelDraft::default()
        })
        .await
        .expect("insert succeeds");

    assert_eq!(funnel.name, "Sales");
    assert_eq!(funnel.color, "#ff0000");
    assert_eq!(funnel.description, "");
    assert!(funnel.active);
    let today = Some("16/10/2026".to_owned());
    assert_eq!(funnel.created_at.map(|date| date.to_string()), today);
    assert_eq!(funnel.updated_at.map(|date| date.to_string()), today);
}

#[rstest]
#[tokio::test]
async fn insert_prefers_echoed_key_over_last_row() {
    let mut gateway = MockErpGateway::new();
    gateway
        .expect_save()
        .times(1)
        .returning(|_| Ok(SaveOutcome::with_key("1")));
    gateway.expect_load().times(1).returning(|_| {
        Ok(vec![
            ErpRecord::from_iter([("CODFUNIL", "1"), ("NOME", "Ours"), ("ATIVO", "S")]),
            ErpRecord::from_iter([("CODFUNIL", "2"), ("NOME", "Concurrent"), ("ATIVO", "S")]),
        ])
    });
    let service = FunnelService::new(Arc::new(gateway), Arc::new(FixedClock::on(2026, 1, 1)))
        .with_read_after_write(ReadAfterWrite::immediate());

    let funnel = service
        .save_funnel(FunnelDraft {
            name: Some("Ours".into()),
            ..FunnelDraft::default()
        })
        .await
        .expect("insert succeeds");

    assert_eq!(funnel.id, "1", "a concurrent row must not be mistaken for ours");
}

#[rstest]
#[tokio::test]
async fn insert_without_echo_falls_back_to_last_row() {
    let erp = Arc::new(InMemoryErpGateway::without_key_echo());
    seed_funnel(&erp, "Existing", "S");

    let funnel = service(&erp)
        .save_funnel(FunnelDraft {
            name: Some("Newest".into()),
            ..FunnelDraft::default()
        })
        .await
        .expect("insert succeeds");

    assert_eq!(funnel.name, "Newest");
    assert_eq!(funnel.color, DEFAULT_COLOR);
}

#[rstest]
#[tokio::test]
async fn updating_a_funnel_touches_only_editable_columns(erp: Arc<InMemoryErpGateway>) {
    let id = erp.seed(
        &FUNNELS,
        &[
            ("NOME", "Old"),
            ("ATIVO", "S"),
            ("DATA_CRIACAO", "01/01/2025"),
        ],
    );

    let funnel = service(&erp)
        .save_funnel(FunnelDraft {
            id: Some(id.clone()),
            name: Some("Renamed".into()),
            description: Some("desc".into()),
            color: None,
        })
        .await
        .expect("update succeeds");

    assert_eq!(funnel.id, id);
    assert_eq!(funnel.name, "Renamed");
    assert_eq!(
        funnel.created_at.map(|date| date.to_string()).as_deref(),
        Some("01/01/2025"),
        "creation date is immutable"
    );
    let save = erp.saves().pop().expect("one save");
    let fields: Vec<_> = save.values().iter().map(|(field, _)| *field).collect();
    assert_eq!(fields, ["NOME", "DESCRICAO", "COR", "DATA_ATUALIZACAO"]);
}

#[rstest]
#[tokio::test]
async fn updating_a_missing_funnel_surfaces_rejection(erp: Arc<InMemoryErpGateway>) {
    let error = service(&erp)
        .save_funnel(FunnelDraft {
            id: Some("404".into()),
            ..FunnelDraft::default()
        })
        .await
        .expect_err("unknown key");
    assert_eq!(error.code(), ErrorCode::UpstreamError);
}

#[rstest]
#[tokio::test]
async fn stage_insert_requires_funnel(erp: Arc<InMemoryErpGateway>) {
    let error = service(&erp)
        .save_stage(StageDraft {
            name: Some("Lost".into()),
            ..StageDraft::default()
        })
        .await
        .expect_err("funnel is required");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(erp.saves().is_empty());
}

#[rstest]
#[tokio::test]
async fn stage_insert_returns_echoed_row(erp: Arc<InMemoryErpGateway>) {
    erp.seed(
        &FUNNEL_STAGES,
        &[("CODFUNIL", "2"), ("NOME", "Late"), ("ORDEM", "9"), ("ATIVO", "S")],
    );

    let stage = service(&erp)
        .save_stage(StageDraft {
            funnel_id: Some("2".into()),
            name: Some("Early".into()),
            rank: Some(1),
            ..StageDraft::default()
        })
        .await
        .expect("insert succeeds");

    assert_eq!(stage.name, "Early", "echoed key wins over last-by-rank");
    assert_eq!(stage.rank, 1);
    assert!(stage.active);
}

#[rstest]
#[tokio::test]
async fn stage_update_reloads_by_key(erp: Arc<InMemoryErpGateway>) {
    let id = erp.seed(
        &FUNNEL_STAGES,
        &[("CODFUNIL", "2"), ("NOME", "Draft"), ("ORDEM", "1"), ("ATIVO", "S")],
    );

    let stage = service(&erp)
        .save_stage(StageDraft {
            id: Some(id.clone()),
            name: Some("Qualified".into()),
            rank: Some(4),
            color: Some("#00ff00".into()),
            ..StageDraft::default()
        })
        .await
        .expect("update succeeds");

    assert_eq!(stage.id, id);
    assert_eq!(stage.funnel_id, "2");
    assert_eq!(stage.rank, 4);
    assert_eq!(stage.color, "#00ff00");
}

#[rstest]
#[tokio::test]
async fn soft_deleted_funnel_remains_queryable_as_inactive(erp: Arc<InMemoryErpGateway>) {
    let id = seed_funnel(&erp, "Temp", "S");
    let service = service(&erp);

    service.delete_funnel(&id).await.expect("delete succeeds");

    assert!(service.list_funnels(None, true).await.expect("list").is_empty());
    let inactive = erp
        .load(&LoadRequest::new(&FUNNELS).filter(Criteria::inactive()).expect("criteria"))
        .await
        .expect("inactive load");
    assert_eq!(inactive.len(), 1, "row is flagged, never removed");
    assert_eq!(inactive.first().and_then(|row| row.get("DATA_ATUALIZACAO")), Some("16/10/2026"));
}

#[rstest]
#[tokio::test]
async fn soft_deleted_stage_leaves_listing(erp: Arc<InMemoryErpGateway>) {
    let id = erp.seed(
        &FUNNEL_STAGES,
        &[("CODFUNIL", "1"), ("NOME", "A"), ("ORDEM", "1"), ("ATIVO", "S")],
    );
    let service = service(&erp);

    service.delete_stage(&id).await.expect("delete succeeds");

    assert!(service.list_stages("1").await.expect("list").is_empty());
    assert_eq!(erp.rows(&FUNNEL_STAGES).len(), 1);
}

#[rstest]
#[tokio::test]
async fn assigning_then_removing_grants_toggles_visibility(erp: Arc<InMemoryErpGateway>) {
    let sales = seed_funnel(&erp, "Sales", "S");
    grant(&erp, &sales, "3", "S");
    let service = service(&erp);

    service.assign_funnel(&sales, 3).await.expect("assign");
    assert_eq!(service.list_user_funnels(3).await.expect("grants"), [sales.clone()]);

    service
        .remove_funnel_permission(&sales, 3)
        .await
        .expect("remove");

    assert!(service.list_user_funnels(3).await.expect("grants").is_empty());
    let deactivations = erp
        .saves()
        .iter()
        .filter(|save| save.primary_key().is_some())
        .count();
    assert_eq!(deactivations, 2, "duplicate active grants are all revoked");
}

#[rstest]
#[tokio::test]
async fn removing_a_missing_grant_is_a_no_op(erp: Arc<InMemoryErpGateway>) {
    service(&erp)
        .remove_funnel_permission("1", 3)
        .await
        .expect("nothing to remove");
    assert!(erp.saves().is_empty());
}

#[rstest]
fn resolve_inserted_prefers_echoed_key() {
    let rows = vec!["1", "2", "3"];
    assert_eq!(resolve_inserted(rows.clone(), Some("2"), |row| *row), Some("2"));
    assert_eq!(resolve_inserted(rows.clone(), Some("9"), |row| *row), Some("3"));
    assert_eq!(resolve_inserted(rows, None, |row| *row), Some("3"));
    assert_eq!(resolve_inserted(Vec::<&str>::new(), None, |row| *row), None);
}
