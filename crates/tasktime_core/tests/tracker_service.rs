use tasktime_core::db::open_db_in_memory;
use tasktime_core::{
    CreateProjectRequest, CreateSubtaskRequest, CreateTaskRequest, EntityRef, Operation,
    ProjectId, RecordingViewRefresh, ServiceError, SqliteTrackerRepository, SubtaskId, TaskId,
    TrackerService, UpdateProjectRequest, UpdateSubtaskRequest, UpdateTaskRequest,
    ValidationError, ViewPath,
};
use uuid::Uuid;

type Service<'a> = TrackerService<SqliteTrackerRepository<'a>, &'a RecordingViewRefresh>;

fn project(service: &Service<'_>, name: &str) -> ProjectId {
    service
        .create_project(&CreateProjectRequest {
            name: name.to_string(),
            description: None,
        })
        .unwrap()
}

fn subtask(service: &Service<'_>, project_id: ProjectId, name: &str) -> SubtaskId {
    service
        .create_subtask(&CreateSubtaskRequest {
            project_id,
            name: name.to_string(),
            description: None,
        })
        .unwrap()
}

fn task(service: &Service<'_>, subtask_id: SubtaskId, name: &str, time: Option<i64>) -> TaskId {
    service
        .create_task(&CreateTaskRequest {
            subtask_id,
            name: name.to_string(),
            description: None,
            total_time_ms: time,
        })
        .unwrap()
        .id
}

fn table_count(conn: &rusqlite::Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn rollups_follow_task_times_through_create_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let p = project(&service, "Thesis");
    let s = subtask(&service, p, "Research");
    let t1 = task(&service, s, "Read papers", Some(3_600_000));
    task(&service, s, "Take notes", Some(1_800_000));

    let sub = service.get_subtask(s).unwrap();
    assert_eq!(sub.rollup.total_time_ms, 5_400_000);
    assert_eq!(sub.rollup.total_tasks, 2);

    let projects = service.list_projects();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].project.id, p);
    assert_eq!(projects[0].rollup.total_time_ms, 5_400_000);
    assert_eq!(projects[0].rollup.total_tasks, 2);

    service.delete_task(t1).unwrap();

    let project = service.get_project(p).unwrap();
    assert_eq!(project.rollup.total_time_ms, 1_800_000);
    assert_eq!(project.rollup.total_tasks, 1);
}

#[test]
fn project_counts_tasks_not_subtasks() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let p = project(&service, "Website");
    let design = subtask(&service, p, "Design");
    subtask(&service, p, "Empty");
    let build = subtask(&service, p, "Build");
    task(&service, design, "Wireframes", Some(60_000));
    task(&service, build, "Scaffold", Some(120_000));
    task(&service, build, "Deploy", None);

    let summary = service.get_project(p).unwrap();
    assert_eq!(summary.rollup.total_tasks, 3);
    assert_eq!(summary.rollup.total_time_ms, 180_000);

    let subtasks = service.list_subtasks(p);
    let names: Vec<&str> = subtasks.iter().map(|s| s.subtask.name.as_str()).collect();
    assert_eq!(names, vec!["Design", "Empty", "Build"]);
    assert_eq!(subtasks[1].rollup.total_tasks, 0);
    assert_eq!(subtasks[1].rollup.total_time_ms, 0);
}

#[test]
fn blank_project_name_is_rejected_and_nothing_persists() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let err = service
        .create_project(&CreateProjectRequest {
            name: "   ".to_string(),
            description: Some("ignored".to_string()),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyName)
    ));
    assert_eq!(err.code(), "validation_failed");
    assert_eq!(table_count(&conn, "projects"), 0);
    assert!(views.take().is_empty());
}

#[test]
fn subtask_under_unknown_project_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let missing = Uuid::new_v4();

    let err = service
        .create_subtask(&CreateSubtaskRequest {
            project_id: missing,
            name: "Orphan".to_string(),
            description: None,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::UnknownProject(id)) if id == missing
    ));
    assert_eq!(table_count(&conn, "subtasks"), 0);
    assert!(views.take().is_empty());
}

#[test]
fn task_under_unknown_subtask_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let missing = Uuid::new_v4();

    let err = service
        .create_task(&CreateTaskRequest {
            subtask_id: missing,
            name: "Orphan".to_string(),
            description: None,
            total_time_ms: Some(1_000),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::UnknownSubtask(id)) if id == missing
    ));
    assert_eq!(table_count(&conn, "tasks"), 0);
}

#[test]
fn negative_task_time_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let p = project(&service, "P");
    let s = subtask(&service, p, "S");
    let t = task(&service, s, "T", Some(10));

    let create_err = service
        .create_task(&CreateTaskRequest {
            subtask_id: s,
            name: "Bad".to_string(),
            description: None,
            total_time_ms: Some(-1),
        })
        .unwrap_err();
    assert!(matches!(
        create_err,
        ServiceError::Validation(ValidationError::NegativeTime(-1))
    ));

    let update_err = service
        .update_task(
            t,
            &UpdateTaskRequest {
                name: "T".to_string(),
                description: None,
                total_time_ms: Some(-5),
            },
        )
        .unwrap_err();
    assert!(matches!(
        update_err,
        ServiceError::Validation(ValidationError::NegativeTime(-5))
    ));
    assert_eq!(service.get_task(t).unwrap().total_time_ms, 10);
}

#[test]
fn deleting_project_cascades_to_subtasks_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let p = project(&service, "Doomed");
    let s = subtask(&service, p, "S");
    let t = task(&service, s, "T", Some(1_000));
    let keep = project(&service, "Keeper");

    service.delete_project(p).unwrap();

    assert!(service.get_project(p).is_none());
    assert!(service.get_subtask(s).is_none());
    assert!(service.get_task(t).is_none());
    assert_eq!(table_count(&conn, "subtasks"), 0);
    assert_eq!(table_count(&conn, "tasks"), 0);
    assert!(service.get_project(keep).is_some());
}

#[test]
fn deleting_subtask_removes_its_tasks_and_leaves_siblings() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let p = project(&service, "P");
    let doomed = subtask(&service, p, "Doomed");
    let sibling = subtask(&service, p, "Sibling");
    let doomed_task = task(&service, doomed, "Gone", Some(2_000));
    let sibling_task = task(&service, sibling, "Stays", Some(3_000));

    service.delete_subtask(doomed, p).unwrap();

    assert!(service.get_task(doomed_task).is_none());
    assert!(service.get_task(sibling_task).is_some());
    let remaining = service.list_subtasks(p);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].subtask.id, sibling);
    assert_eq!(service.get_project(p).unwrap().rollup.total_time_ms, 3_000);
}

#[test]
fn task_time_defaults_to_zero_and_update_keeps_or_replaces_it() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let p = project(&service, "P");
    let s = subtask(&service, p, "S");

    let created = service
        .create_task(&CreateTaskRequest {
            subtask_id: s,
            name: "  Untimed ".to_string(),
            description: Some("  ".to_string()),
            total_time_ms: None,
        })
        .unwrap();
    assert_eq!(created.total_time_ms, 0);
    assert_eq!(created.name, "Untimed");
    assert_eq!(created.description, None);

    let renamed = service
        .update_task(
            created.id,
            &UpdateTaskRequest {
                name: "Renamed".to_string(),
                description: Some("details".to_string()),
                total_time_ms: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.total_time_ms, 0);

    let timed = service
        .update_task(
            created.id,
            &UpdateTaskRequest {
                name: "Renamed".to_string(),
                description: None,
                total_time_ms: Some(5_000),
            },
        )
        .unwrap();
    assert_eq!(timed.total_time_ms, 5_000);

    let kept = service
        .update_task(
            created.id,
            &UpdateTaskRequest {
                name: "Renamed again".to_string(),
                description: None,
                total_time_ms: None,
            },
        )
        .unwrap();
    assert_eq!(kept.total_time_ms, 5_000);
    assert_eq!(service.get_subtask(s).unwrap().rollup.total_time_ms, 5_000);
}

#[test]
fn stale_stored_subtask_total_is_ignored() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let p = project(&service, "P");
    let s = subtask(&service, p, "S");
    task(&service, s, "T", Some(42_000));

    conn.execute(
        "UPDATE subtasks SET total_time = 999999999 WHERE id = ?1;",
        [s.to_string()],
    )
    .unwrap();

    assert_eq!(service.get_subtask(s).unwrap().rollup.total_time_ms, 42_000);
    assert_eq!(service.list_subtasks(p)[0].rollup.total_time_ms, 42_000);
    assert_eq!(service.list_projects()[0].rollup.total_time_ms, 42_000);
}

#[test]
fn update_project_and_subtask_replace_details() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let p = project(&service, "Old");
    let created_at = service.get_project(p).unwrap().project.created_at;
    let s = subtask(&service, p, "Old subtask");
    task(&service, s, "T", Some(7_000));

    service
        .update_project(
            p,
            &UpdateProjectRequest {
                name: "New".to_string(),
                description: Some("desc".to_string()),
            },
        )
        .unwrap();
    let updated = service.get_project(p).unwrap();
    assert_eq!(updated.project.name, "New");
    assert_eq!(updated.project.description.as_deref(), Some("desc"));
    assert_eq!(updated.project.created_at, created_at);

    let subtask = service
        .update_subtask(
            s,
            &UpdateSubtaskRequest {
                name: "New subtask".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(subtask.subtask.name, "New subtask");
    assert_eq!(subtask.subtask.project_id, p);
    assert_eq!(subtask.rollup.total_time_ms, 7_000);
    assert_eq!(subtask.rollup.total_tasks, 1);
}

#[test]
fn writes_on_unknown_ids_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let missing = Uuid::new_v4();
    let details = UpdateProjectRequest {
        name: "Name".to_string(),
        description: None,
    };

    assert!(matches!(
        service.update_project(missing, &details),
        Err(ServiceError::NotFound(EntityRef::Project(id))) if id == missing
    ));
    assert!(matches!(
        service.delete_project(missing),
        Err(ServiceError::NotFound(EntityRef::Project(_)))
    ));
    assert!(matches!(
        service.update_subtask(
            missing,
            &UpdateSubtaskRequest {
                name: "Name".to_string(),
                description: None,
            }
        ),
        Err(ServiceError::NotFound(EntityRef::Subtask(_)))
    ));
    assert!(matches!(
        service.delete_subtask(missing, Uuid::new_v4()),
        Err(ServiceError::NotFound(EntityRef::Subtask(_)))
    ));
    assert!(matches!(
        service.update_task(
            missing,
            &UpdateTaskRequest {
                name: "Name".to_string(),
                description: None,
                total_time_ms: None,
            }
        ),
        Err(ServiceError::NotFound(EntityRef::Task(_)))
    ));
    let err = service.delete_task(missing).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Task(_))));
    assert_eq!(err.code(), "not_found");
    assert!(views.take().is_empty());
}

#[test]
fn reads_of_missing_entities_are_absent() {
    let conn = open_db_in_memory().unwrap();
    let service = TrackerService::new(SqliteTrackerRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    assert!(service.list_projects().is_empty());
    assert!(service.get_project(missing).is_none());
    assert!(service.list_subtasks(missing).is_empty());
    assert!(service.get_subtask(missing).is_none());
    assert!(service.list_tasks(missing).is_empty());
    assert!(service.get_task(missing).is_none());
    assert!(matches!(service.try_get_project(missing), Ok(None)));
}

#[test]
fn view_refresh_targets_follow_each_mutation() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);

    let p = project(&service, "P");
    assert_eq!(views.revalidated(), vec![ViewPath::Overview]);
    assert_eq!(views.redirect_target(), None);
    views.take();

    service
        .update_project(
            p,
            &UpdateProjectRequest {
                name: "P2".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(
        views.revalidated(),
        vec![ViewPath::Overview, ViewPath::Project(p)]
    );
    views.take();

    let s = subtask(&service, p, "S");
    assert_eq!(views.revalidated(), vec![ViewPath::Project(p)]);
    views.take();

    let subtask_view = ViewPath::Subtask {
        project_id: p,
        subtask_id: s,
    };
    service
        .update_subtask(
            s,
            &UpdateSubtaskRequest {
                name: "S2".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(
        views.revalidated(),
        vec![ViewPath::Project(p), subtask_view]
    );
    views.take();

    let t = task(&service, s, "T", Some(1));
    let task_views = vec![ViewPath::Overview, ViewPath::Project(p), subtask_view];
    assert_eq!(views.revalidated(), task_views);
    views.take();

    service
        .update_task(
            t,
            &UpdateTaskRequest {
                name: "T2".to_string(),
                description: None,
                total_time_ms: Some(2),
            },
        )
        .unwrap();
    assert_eq!(views.revalidated(), task_views);
    views.take();

    service.delete_task(t).unwrap();
    assert_eq!(views.revalidated(), task_views);
    assert_eq!(views.redirect_target(), None);
    views.take();

    service.delete_subtask(s, p).unwrap();
    assert_eq!(
        views.revalidated(),
        vec![ViewPath::Overview, ViewPath::Project(p)]
    );
    assert_eq!(views.redirect_target(), Some(ViewPath::Project(p)));
    views.take();

    service.delete_project(p).unwrap();
    assert_eq!(
        views.revalidated(),
        vec![ViewPath::Overview, ViewPath::Project(p)]
    );
    assert_eq!(views.redirect_target(), Some(ViewPath::Overview));
}

#[test]
fn store_failures_degrade_lenient_reads_and_surface_in_strict_ones() {
    let conn = open_db_in_memory().unwrap();
    let views = RecordingViewRefresh::new();
    let service =
        TrackerService::with_view_refresh(SqliteTrackerRepository::try_new(&conn).unwrap(), &views);
    let p = project(&service, "P");
    let s = subtask(&service, p, "S");
    views.take();

    conn.execute_batch("DROP TABLE tasks;").unwrap();

    assert!(service.list_projects().is_empty());
    assert!(service.get_project(p).is_none());
    assert!(service.list_subtasks(p).is_empty());
    assert!(service.get_subtask(s).is_none());

    let err = service.try_list_projects().unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store {
            operation: Operation::ListProjects,
            ..
        }
    ));
    assert_eq!(err.code(), "store_failed");
    assert_eq!(err.to_string(), "failed to fetch projects");
    assert!(std::error::Error::source(&err).is_some());

    let write_err = service
        .create_task(&CreateTaskRequest {
            subtask_id: s,
            name: "T".to_string(),
            description: None,
            total_time_ms: None,
        })
        .unwrap_err();
    assert!(matches!(
        write_err,
        ServiceError::Store {
            operation: Operation::CreateTask,
            ..
        }
    ));
    assert!(views.take().is_empty());
}
