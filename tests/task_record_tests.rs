use chrono::NaiveDateTime;
use xer_schedule::{
    Calendar, DecodeOptions, DurationError, FlagDecoding, ParseError, Registries, Task,
    TaskBuilder, Wbs,
    decode::parse_datetime,
    fields::{ConstraintType, TaskStatus, TaskType},
    task::TASK_FIELDS,
};

fn record(values: &[(&str, &str)]) -> Vec<String> {
    let mut tokens = vec![String::new(); TASK_FIELDS.len()];
    for (name, value) in values {
        let idx = TASK_FIELDS
            .iter()
            .position(|field| field == name)
            .unwrap_or_else(|| panic!("unknown TASK field {name}"));
        tokens[idx] = value.to_string();
    }
    tokens
}

fn dt(value: &str) -> NaiveDateTime {
    parse_datetime(value).unwrap()
}

fn registries_with_calendar(id: i64, day_hr_cnt: f64) -> Registries {
    let mut registries = Registries::default();
    registries
        .calendars
        .insert(Calendar::new(id, "Standard", day_hr_cnt));
    registries
}

#[test]
fn blank_record_builds_with_null_fields() {
    let task = Task::from_record(&record(&[]), &Registries::default()).unwrap();

    assert_eq!(task.task_id, None);
    assert_eq!(task.id(), None);
    assert_eq!(task.clndr_id, None);
    assert!(task.calendar.is_none());
    assert!(task.wbs.is_none());
    assert_eq!(task.remain_drtn_hr_cnt, 0.0);
    assert_eq!(task.target_drtn_hr_cnt, 0.0);
    assert_eq!(task.float(), None);
    assert_eq!(task.duration(), Ok(0.0));
    assert_eq!(task.start_date(), None);
    assert_eq!(task.end_date(), None);
    assert_eq!(task.task_code, "");
}

#[test]
fn identifiers_and_strings_are_decoded() {
    let tokens = record(&[
        ("task_id", "4512"),
        ("proj_id", "77"),
        ("rsrc_id", "3"),
        ("task_code", "  A1000 "),
        ("task_name", "Mobilize site\t"),
        ("status_code", "TK_Active"),
        ("create_user", " admin "),
        ("create_date", "2023-11-02 10:15"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    assert_eq!(task.id(), Some(4512));
    assert_eq!(task.proj_id, Some(77));
    assert_eq!(task.rsrc_id, Some(3));
    assert_eq!(task.task_code, "A1000");
    assert_eq!(task.task_name, "Mobilize site");
    assert_eq!(task.create_user, "admin");
    // audit dates stay as text
    assert_eq!(task.create_date, "2023-11-02 10:15");
    assert_eq!(task.to_string(), "A1000");
}

#[test]
fn float_is_total_float_over_eight_hours() {
    let registries = Registries::default();
    let task = Task::from_record(&record(&[("total_float_hr_cnt", "16")]), &registries).unwrap();
    assert_eq!(task.float(), Some(2.0));

    let zero = Task::from_record(&record(&[("total_float_hr_cnt", "0")]), &registries).unwrap();
    assert_eq!(zero.total_float_hr_cnt, Some(0.0));
    assert_eq!(zero.float(), None);

    let negative =
        Task::from_record(&record(&[("total_float_hr_cnt", " -12 ")]), &registries).unwrap();
    assert_eq!(negative.float(), Some(-1.5));
}

#[test]
fn duration_uses_calendar_hours_per_day() {
    let registries = registries_with_calendar(1, 8.0);
    let tokens = record(&[
        ("clndr_id", "1"),
        ("remain_drtn_hr_cnt", "40"),
        ("target_drtn_hr_cnt", "40"),
    ]);
    let task = Task::from_record(&tokens, &registries).unwrap();

    assert_eq!(task.target_drtn_hr_cnt, 40.0);
    assert_eq!(task.duration(), Ok(5.0));
}

#[test]
fn resolved_calendar_drives_duration_end_to_end() {
    let registries = registries_with_calendar(5, 10.0);
    let tokens = record(&[
        ("task_id", "1"),
        ("clndr_id", "5"),
        ("remain_drtn_hr_cnt", "50"),
        ("target_drtn_hr_cnt", "50"),
    ]);
    let task = Task::from_record(&tokens, &registries).unwrap();

    let calendar = task.calendar.as_deref().expect("calendar resolved");
    assert_eq!(calendar.day_hr_cnt, Some(10.0));
    assert_eq!(task.duration(), Ok(5.0));
}

#[test]
fn target_duration_defaults_from_remaining_duration_token() {
    let registries = registries_with_calendar(1, 8.0);

    let no_remaining = record(&[("clndr_id", "1"), ("target_drtn_hr_cnt", "40")]);
    let task = Task::from_record(&no_remaining, &registries).unwrap();
    assert_eq!(task.target_drtn_hr_cnt, 0.0);
    assert_eq!(task.duration(), Ok(0.0));

    let no_target = record(&[("clndr_id", "1"), ("remain_drtn_hr_cnt", "16")]);
    let task = Task::from_record(&no_target, &registries).unwrap();
    assert_eq!(task.remain_drtn_hr_cnt, 16.0);
    assert_eq!(task.target_drtn_hr_cnt, 0.0);
}

#[test]
fn duration_without_calendar_is_an_error() {
    let tokens = record(&[
        ("task_code", "A2000"),
        ("clndr_id", "42"),
        ("remain_drtn_hr_cnt", "8"),
        ("target_drtn_hr_cnt", "24"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    assert!(task.calendar.is_none());
    assert_eq!(
        task.duration(),
        Err(DurationError::MissingCalendar {
            task_code: "A2000".into(),
            hours: 24.0,
        })
    );
}

#[test]
fn duration_with_zero_hour_calendar_is_an_error() {
    let registries = registries_with_calendar(3, 0.0);
    let tokens = record(&[
        ("clndr_id", "3"),
        ("remain_drtn_hr_cnt", "8"),
        ("target_drtn_hr_cnt", "8"),
    ]);
    let task = Task::from_record(&tokens, &registries).unwrap();

    assert_eq!(
        task.duration(),
        Err(DurationError::NoDayHours { clndr_id: Some(3) })
    );
}

#[test]
fn start_date_prefers_actual_then_planned_start() {
    let registries = Registries::default();
    let planned = record(&[("target_start_date", "2024-01-15 08:00")]);
    let task = Task::from_record(&planned, &registries).unwrap();
    assert_eq!(task.start_date(), Some(dt("2024-01-15 08:00")));

    let started = record(&[
        ("act_start_date", "2024-01-16 07:00"),
        ("target_start_date", "2024-01-15 08:00"),
    ]);
    let task = Task::from_record(&started, &registries).unwrap();
    assert_eq!(task.start_date(), Some(dt("2024-01-16 07:00")));
}

#[test]
fn end_date_falls_back_to_planned_start_not_planned_finish() {
    let registries = Registries::default();
    let tokens = record(&[
        ("target_start_date", "2024-01-15 08:00"),
        ("target_end_date", "2024-01-19 17:00"),
    ]);
    let task = Task::from_record(&tokens, &registries).unwrap();
    assert_eq!(task.end_date(), Some(dt("2024-01-15 08:00")));

    let finished = record(&[
        ("act_end_date", "2024-01-18 16:00"),
        ("target_start_date", "2024-01-15 08:00"),
        ("target_end_date", "2024-01-19 17:00"),
    ]);
    let task = Task::from_record(&finished, &registries).unwrap();
    assert_eq!(task.end_date(), Some(dt("2024-01-18 16:00")));
}

#[test]
fn unresolved_calendar_is_silently_empty() {
    let registries = registries_with_calendar(1, 8.0);
    let task = Task::from_record(&record(&[("clndr_id", "99")]), &registries).unwrap();

    assert_eq!(task.clndr_id, Some(99));
    assert!(task.calendar.is_none());
}

#[test]
fn strict_references_reject_unknown_ids() {
    let registries = registries_with_calendar(1, 8.0);
    let options = DecodeOptions {
        strict_references: true,
        ..DecodeOptions::default()
    };
    let builder = TaskBuilder::with_options(&registries, options);

    let err = builder.build(&record(&[("clndr_id", "99")])).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnresolvedReference {
            field: "clndr_id",
            id: 99
        }
    ));

    let err = builder
        .build(&record(&[("clndr_id", "1"), ("wbs_id", "12")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnresolvedReference {
            field: "wbs_id",
            id: 12
        }
    ));

    // null ids never trigger a lookup
    assert!(builder.build(&record(&[])).is_ok());
}

#[test]
fn wbs_reference_is_resolved() {
    let mut registries = Registries::default();
    registries.wbs.insert(Wbs::new(7, "CIV", "Civil works"));

    let task = Task::from_record(&record(&[("wbs_id", "7")]), &registries).unwrap();
    let wbs = task.wbs.as_deref().expect("wbs resolved");
    assert_eq!(wbs.wbs_name, "Civil works");
}

#[test]
fn associations_are_fixed_at_construction() {
    let mut registries = Registries::default();
    let early = Task::from_record(&record(&[("clndr_id", "5")]), &registries).unwrap();

    registries
        .calendars
        .insert(Calendar::new(5, "Late arrival", 8.0));
    let late = Task::from_record(&record(&[("clndr_id", "5")]), &registries).unwrap();

    assert!(early.calendar.is_none());
    assert!(late.calendar.is_some());

    drop(registries);
    assert_eq!(late.calendar.as_deref().unwrap().clndr_name, "Late arrival");
}

#[test]
fn malformed_numbers_fail_the_record() {
    let registries = Registries::default();

    let err = Task::from_record(&record(&[("task_id", "12a")]), &registries).unwrap_err();
    assert!(matches!(
        err,
        ParseError::MalformedInteger { field: "task_id", ref value, .. } if value == "12a"
    ));

    let err =
        Task::from_record(&record(&[("total_float_hr_cnt", "n/a")]), &registries).unwrap_err();
    assert!(matches!(
        err,
        ParseError::MalformedFloat {
            field: "total_float_hr_cnt",
            ..
        }
    ));

    // whitespace is not an empty token
    let err = Task::from_record(&record(&[("clndr_id", " ")]), &registries).unwrap_err();
    assert!(matches!(
        err,
        ParseError::MalformedInteger {
            field: "clndr_id",
            ..
        }
    ));
}

#[test]
fn malformed_date_fails_the_record() {
    let err = Task::from_record(
        &record(&[("act_start_date", "2024/01/15 08:00")]),
        &Registries::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ParseError::MalformedDate {
            field: "act_start_date",
            ..
        }
    ));
    assert!(err.to_string().contains("act_start_date"));

    for padded in [" 2024-01-15 08:00", "2024-01-15 08:00 ", "\t2024-01-15 08:00"] {
        let err = Task::from_record(
            &record(&[("target_start_date", padded)]),
            &Registries::default(),
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                ParseError::MalformedDate {
                    field: "target_start_date",
                    ..
                }
            ),
            "{padded:?} should be rejected"
        );
    }
}

#[test]
fn short_record_is_rejected() {
    let tokens = vec![String::new(); TASK_FIELDS.len() - 1];
    let err = Task::from_record(&tokens, &Registries::default()).unwrap_err();

    assert!(matches!(
        err,
        ParseError::RecordTooShort {
            entity: "TASK",
            expected: 60,
            actual: 59
        }
    ));
}

#[test]
fn extra_trailing_tokens_are_ignored() {
    let mut tokens = record(&[("task_code", "A1")]);
    tokens.push("unexpected".into());
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();
    assert_eq!(task.task_code, "A1");
}

#[test]
fn literal_flags_treat_any_token_as_true() {
    let tokens = record(&[
        ("rev_fdbk_flag", "N"),
        ("lock_plan_flag", "Y"),
        ("driving_path_flag", "0"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    assert_eq!(task.rev_fdbk_flag, Some(true));
    assert_eq!(task.lock_plan_flag, Some(true));
    assert_eq!(task.driving_path_flag, Some(true));
    assert_eq!(task.auto_compute_act_flag, None);
}

#[test]
fn strict_flags_read_yes_and_no() {
    let registries = Registries::default();
    let options = DecodeOptions {
        flags: FlagDecoding::Strict,
        ..DecodeOptions::default()
    };
    let builder = TaskBuilder::with_options(&registries, options);

    let task = builder
        .build(&record(&[("rev_fdbk_flag", "N"), ("lock_plan_flag", "y")]))
        .unwrap();
    assert_eq!(task.rev_fdbk_flag, Some(false));
    assert_eq!(task.lock_plan_flag, Some(true));

    let err = builder
        .build(&record(&[("driving_path_flag", "maybe")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ParseError::MalformedFlag {
            field: "driving_path_flag",
            ..
        }
    ));
}

#[test]
fn constraints_pass_through_type_and_date() {
    let tokens = record(&[
        ("cstr_type", "CS_ALAP"),
        ("cstr_date", "2024-03-01 08:00"),
        ("cstr_type2", "CS_MEOB"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    let constraint = task.constraints();
    assert_eq!(constraint.constraint_type, "CS_ALAP");
    assert_eq!(constraint.constraint_date, Some(dt("2024-03-01 08:00")));
    assert_eq!(task.constraint_kind(), Some(ConstraintType::AsLateAsPossible));
    assert_eq!(
        task.secondary_constraint_kind(),
        Some(ConstraintType::FinishOnOrBefore)
    );

    let json = serde_json::to_value(&constraint).unwrap();
    assert_eq!(json["ConstraintType"], "CS_ALAP");
    assert!(json.get("ConstraintDate").is_some());
}

#[test]
fn external_dates_are_gated_on_second_constraint_date() {
    let registries = Registries::default();
    let ungated = record(&[
        ("external_early_start_date", "2024-02-01 08:00"),
        ("external_late_end_date", "2024-02-09 17:00"),
    ]);
    let task = Task::from_record(&ungated, &registries).unwrap();
    assert_eq!(task.external_early_start_date, None);
    assert_eq!(task.external_late_end_date, None);

    let gated = record(&[
        ("cstr_date2", "2024-01-31 08:00"),
        ("external_early_start_date", "2024-02-01 08:00"),
        ("external_late_end_date", "2024-02-09 17:00"),
    ]);
    let task = Task::from_record(&gated, &registries).unwrap();
    assert_eq!(task.cstr_date2, Some(dt("2024-01-31 08:00")));
    assert_eq!(task.external_early_start_date, Some(dt("2024-02-01 08:00")));
    assert_eq!(task.external_late_end_date, Some(dt("2024-02-09 17:00")));
}

#[test]
fn classification_codes_have_typed_views() {
    let tokens = record(&[
        ("status_code", "In Progress"),
        ("task_type", "TT_FinMile"),
        ("complete_pct_type", "CP_Phys"),
        ("duration_type", "DT_FixedDUR2"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    assert_eq!(task.status(), Some(TaskStatus::InProgress));
    assert_eq!(task.kind(), Some(TaskType::FinishMilestone));
    assert!(task.kind().unwrap().is_milestone());
    assert_eq!(task.percent_complete_type().map(|t| t.label()), Some("Physical"));
    assert_eq!(task.duration_kind().map(|t| t.code()), Some("DT_FixedDUR2"));

    let unknown = Task::from_record(&record(&[("status_code", "TK_Other")]), &Registries::default())
        .unwrap();
    assert_eq!(unknown.status(), None);
}

#[test]
fn quantities_and_dates_are_decoded() {
    let tokens = record(&[
        ("phys_complete_pct", "37.5"),
        ("est_wt", "1"),
        ("act_work_qty", "12.25"),
        ("remain_equip_qty", "4"),
        ("act_this_per_equip_qty", "0.5"),
        ("early_start_date", "2024-04-01 08:00"),
        ("late_end_date", "2024-04-30 17:00"),
        ("suspend_date", "2024-04-10 12:00"),
    ]);
    let task = Task::from_record(&tokens, &Registries::default()).unwrap();

    assert_eq!(task.phys_complete_pct, Some(37.5));
    assert_eq!(task.est_wt, Some(1.0));
    assert_eq!(task.act_work_qty, Some(12.25));
    assert_eq!(task.remain_work_qty, None);
    assert_eq!(task.remain_equip_qty, Some(4.0));
    assert_eq!(task.act_this_per_equip_qty, Some(0.5));
    assert_eq!(task.early_start_date, Some(dt("2024-04-01 08:00")));
    assert_eq!(task.late_end_date, Some(dt("2024-04-30 17:00")));
    assert_eq!(task.suspend_date, Some(dt("2024-04-10 12:00")));
    assert_eq!(task.resume_date, None);
}
