use serde_json::json;
use tasktime_core::db::open_db_in_memory;
use tasktime_core::{
    CreateProjectRequest, CreateSubtaskRequest, CreateTaskRequest, ProjectSummary,
    SqliteTrackerRepository, TrackerService,
};

#[test]
fn summaries_serialize_with_flattened_camel_case_rollups() {
    let conn = open_db_in_memory().unwrap();
    let service = TrackerService::new(SqliteTrackerRepository::try_new(&conn).unwrap());

    let project_id = service
        .create_project(&CreateProjectRequest {
            name: "Thesis".to_string(),
            description: Some("Final year".to_string()),
        })
        .unwrap();
    let subtask_id = service
        .create_subtask(&CreateSubtaskRequest {
            project_id,
            name: "Research".to_string(),
            description: None,
        })
        .unwrap();
    let task = service
        .create_task(&CreateTaskRequest {
            subtask_id,
            name: "Read".to_string(),
            description: None,
            total_time_ms: Some(5_400_000),
        })
        .unwrap();

    let project = service.get_project(project_id).unwrap();
    let value = serde_json::to_value(&project).unwrap();
    assert_eq!(value["id"], json!(project_id.to_string()));
    assert_eq!(value["name"], json!("Thesis"));
    assert_eq!(value["description"], json!("Final year"));
    assert_eq!(value["createdAt"], json!(project.project.created_at));
    assert_eq!(value["totalTime"], json!(5_400_000));
    assert_eq!(value["totalTasks"], json!(1));

    let subtask = serde_json::to_value(service.get_subtask(subtask_id).unwrap()).unwrap();
    assert_eq!(subtask["projectId"], json!(project_id.to_string()));
    assert_eq!(subtask["description"], json!(null));
    assert_eq!(subtask["totalTime"], json!(5_400_000));
    assert!(subtask.get("total_time").is_none());

    let task_value = serde_json::to_value(&task).unwrap();
    assert_eq!(task_value["subtaskId"], json!(subtask_id.to_string()));
    assert_eq!(task_value["totalTime"], json!(5_400_000));

    let decoded: ProjectSummary = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, project);
}
