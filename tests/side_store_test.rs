// ==========================================
// 侧存储持久化集成测试
// ==========================================
// 测试目标: 文件后端下各 JSON 文档互不覆盖，重启后可读回
// ==========================================

mod test_helpers;

use std::sync::Arc;

use daily_report::api::{
    CommentRequest, HolidayRequest, NumberInput, OverrideRequest, PlanEditRequest,
    WorkDayEditRequest,
};
use daily_report::app::AppState;
use daily_report::config::AppConfig;
use daily_report::repository::{DocumentStorage, FileStorage};
use daily_report::source::RowSource;
use test_helpers::MockSource;

fn file_state(dir: &std::path::Path) -> AppState {
    let storage = Arc::new(FileStorage::new(dir).unwrap());
    AppState::with_backends(
        AppConfig::default(),
        storage as Arc<dyn DocumentStorage>,
        Arc::new(MockSource::new()) as Arc<dyn RowSource>,
    )
}

fn comment(item: &str, text: &str) -> CommentRequest {
    CommentRequest {
        item_code: Some(item.to_string()),
        year_month: Some("202511".to_string()),
        comment: Some(text.to_string()),
    }
}

#[test]
fn test_second_key_preserves_first() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(dir.path());

    state.comment_api.save_comment(&comment("I1", "first")).unwrap();
    state.comment_api.save_comment(&comment("I2", "second")).unwrap();
    state.comment_api.save_comment(&comment("I1", "updated")).unwrap();

    let comments = state.comment_api.get_comments().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments["I1_202511"], "updated");
    assert_eq!(comments["I2_202511"], "second");
}

#[test]
fn test_side_stores_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let state = file_state(dir.path());
        state.comment_api.save_comment(&comment("I1", "note")).unwrap();
        state
            .plan_api
            .edit_plan(&PlanEditRequest {
                item_code: Some("I1".to_string()),
                month: Some("202511".to_string()),
                quantity: Some(NumberInput::Number(12.0)),
            })
            .unwrap();
        state
            .plan_api
            .set_override(&OverrideRequest {
                item_code: Some("I1".to_string()),
                year_month: Some("202511".to_string()),
                est_qty: Some(NumberInput::Number(900.0)),
            })
            .unwrap();
        state
            .calendar_api
            .edit_work_day(&WorkDayEditRequest {
                month: Some("202511".to_string()),
                days: Some(NumberInput::Text("20".to_string())),
            })
            .unwrap();
        state
            .calendar_api
            .add_holiday(&HolidayRequest {
                date: Some("2025-11-03".to_string()),
                description: Some("  Culture Day ".to_string()),
            })
            .unwrap();
    }

    for name in [
        "comments.json",
        "plan_data.json",
        "est_qty_overrides.json",
        "work_days.json",
        "holidays.json",
    ] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }

    let state = file_state(dir.path());
    assert_eq!(state.comment_api.get_comments().unwrap()["I1_202511"], "note");
    assert_eq!(state.plan_api.list_plans().unwrap()["I1_202511"].quantity, 12.0);
    assert_eq!(state.plan_api.list_overrides().unwrap()["I1_202511"], 900.0);
    assert_eq!(state.calendar_api.get_work_days().unwrap()["202511"], 20);
    let holidays = state.calendar_api.list_holidays().unwrap();
    assert_eq!(holidays.len(), 1);
    assert_eq!(holidays[0].description, "Culture Day");
}

#[test]
fn test_empty_override_deletes_entry() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(dir.path());

    let set = OverrideRequest {
        item_code: Some("I1".to_string()),
        year_month: Some("202511".to_string()),
        est_qty: Some(NumberInput::Number(900.0)),
    };
    assert!(state.plan_api.set_override(&set).unwrap().is_some());

    let clear = OverrideRequest {
        est_qty: Some(NumberInput::Text(String::new())),
        ..set
    };
    assert_eq!(state.plan_api.set_override(&clear).unwrap(), None);
    assert!(state.plan_api.list_overrides().unwrap().is_empty());
}

#[test]
fn test_corrupt_document_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("comments.json"), "{broken").unwrap();

    let state = file_state(dir.path());
    assert!(state.comment_api.get_comments().unwrap().is_empty());

    // 下一次写入覆盖损坏文档
    state.comment_api.save_comment(&comment("I1", "fresh")).unwrap();
    let raw = std::fs::read_to_string(dir.path().join("comments.json")).unwrap();
    assert!(raw.contains("fresh"));
}
