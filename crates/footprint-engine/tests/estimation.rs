//! Integration tests for footprint-engine
//!
//! These tests run estimates over small task trees, against hand-built
//! catalogues and against the catalogue shipped with footprint-catalog.

use footprint_catalog::Catalog;
use footprint_domain::aliases::*;
use footprint_domain::{
    EnvironmentalImpact, ImpactCategory, ImpactConstants, ImpactSource, ImpactSourceId,
    ImpactValue, Quantity,
};
use footprint_engine::{EngineConfig, EngineError, Estimator, Resource, ResourceField, Task};

fn q(raw: &str) -> Quantity {
    raw.parse().unwrap()
}

fn climate(manufacture: &str, usage: &str) -> EnvironmentalImpact {
    [(
        ImpactCategory::ClimateChange,
        ImpactValue::new(Some(q(manufacture)), Some(q(usage))),
    )]
    .into_iter()
    .collect()
}

/// One source, 1000 kg_co2e manufacture and 776 kg_co2e use per server
fn mock_catalog() -> Catalog {
    Catalog::from_sources(vec![ImpactSource::new(
        "server",
        "Server",
        server(),
        climate("1000 kg_co2e", "776 kg_co2e"),
    )])
    .unwrap()
}

fn one_server() -> Resource {
    Resource::new("server", "server", q("1 server"))
}

#[test]
fn test_two_resources_of_the_same_source() {
    let catalog = mock_catalog();
    let estimator = Estimator::new(&catalog, EngineConfig::default()).unwrap();

    let mut task = Task::new("task");
    let task_id = task.id;
    estimator.add_resource(&mut task, task_id, one_server()).unwrap();
    estimator.add_resource(&mut task, task_id, one_server()).unwrap();

    let total = estimator
        .category_impact(&task, ImpactCategory::ClimateChange)
        .unwrap();
    assert_eq!(total, q("3552 kg_co2e"));
}

#[test]
fn test_subtask_resources_are_included() {
    let catalog = mock_catalog();
    let estimator = Estimator::new(&catalog, EngineConfig::default()).unwrap();

    let mut task = Task::new("task");
    let task_id = task.id;
    estimator.add_resource(&mut task, task_id, one_server()).unwrap();
    estimator.add_resource(&mut task, task_id, one_server()).unwrap();
    let subtask_id = task.add_subtask(Task::new("subtask"));
    estimator.add_resource(&mut task, subtask_id, one_server()).unwrap();

    let total = estimator
        .category_impact(&task, ImpactCategory::ClimateChange)
        .unwrap();
    assert_eq!(total, q("5328 kg_co2e"));

    let report = estimator.estimate(&task).unwrap();
    let value = report.total.get(ImpactCategory::ClimateChange).unwrap();
    assert_eq!(value.manufacture, Some(q("3000 kg_co2e")));
    assert_eq!(value.usage, Some(q("2328 kg_co2e")));
    assert_eq!(
        report.subtasks[&subtask_id]
            .category_total(ImpactCategory::ClimateChange)
            .unwrap(),
        q("1776 kg_co2e")
    );
}

#[test]
fn test_composite_source_with_repeated_usage() {
    let power = ImpactSource::new("power", "Power", server(), climate("0 kg_co2e", "999 kg_co2e"));
    let hosting = ImpactSource::new("hosting", "Hosting", server(), climate("0 kg_co2e", "1776 kg_co2e"))
        .with_usage("power", q("10 server"))
        .with_usage("power", q("34 server"));
    let catalog = Catalog::from_sources(vec![power, hosting]).unwrap();

    let mut task = Task::new("task");
    task.add_resource(Resource::new("hosting", "hosting", q("1 server")));
    let impact = task
        .get_environmental_impact(&catalog, &ImpactConstants::default())
        .unwrap();
    let usage = impact
        .get(ImpactCategory::ClimateChange)
        .and_then(|v| v.usage.clone())
        .unwrap();
    assert!(usage.approx_eq(&q("45732 kg_co2e"), 1e-12));
}

#[test]
fn test_missing_period_is_reported_on_period() {
    let catalog = Catalog::from_sources(vec![ImpactSource::new(
        "server",
        "Server",
        &server() * &day(),
        climate("1 kg_co2e", "1 kg_co2e"),
    )])
    .unwrap();
    let estimator = Estimator::new(&catalog, EngineConfig::default()).unwrap();

    let mut task = Task::new("task");
    let task_id = task.id;
    let err = estimator
        .add_resource(&mut task, task_id, Resource::new("r", "server", q("3 server")))
        .unwrap_err();
    match err {
        EngineError::Validation(report) => {
            assert!(report.has_error(ResourceField::Period));
            assert_eq!(report.errors.len(), 1);
        }
        other => panic!("expected a validation error, got {}", other),
    }
}

#[test]
fn test_by_resource_type_reconciles_with_total() {
    let catalog = Catalog::builtin().unwrap();
    let estimator = Estimator::new(&catalog, EngineConfig::strict()).unwrap();

    let mut project = Task::new("project");
    let root = project.id;
    let dev = project.add_subtask(Task::new("development"));
    let hosting = project.add_subtask(Task::new("hosting"));

    let people = Resource::new("team", "people", q("4 people"))
        .with_period(q("3 month"))
        .unwrap();
    let laptops = Resource::new("laptops", "laptop", q("4 laptop"))
        .with_duration(q("7 hour")).unwrap()
        .with_frequency(q("1 day")).unwrap()
        .with_period(q("3 month")).unwrap();
    let servers = Resource::new("servers", "server", q("2 server"))
        .with_period(q("1 year"))
        .unwrap();
    let traffic = Resource::new("traffic", "network", q("120 gigabyte"));
    let more_servers = Resource::new("staging", "server", q("1 server"))
        .with_period(q("6 month"))
        .unwrap();

    estimator.add_resource(&mut project, dev, people).unwrap();
    estimator.add_resource(&mut project, dev, laptops).unwrap();
    estimator.add_resource(&mut project, hosting, servers).unwrap();
    estimator.add_resource(&mut project, hosting, more_servers).unwrap();
    estimator.add_resource(&mut project, root, traffic).unwrap();

    let report = estimator.estimate(&project).unwrap();
    assert_eq!(report.resources.len(), 4);

    let mut merged = EnvironmentalImpact::new();
    for bucket in report.resources.values() {
        merged.add(bucket).unwrap();
    }
    assert!(merged.approx_eq(&report.total, 1e-9));

    let mut by_subtask = EnvironmentalImpact::new();
    for subtotal in report.subtasks.values() {
        by_subtask.add(subtotal).unwrap();
    }
    by_subtask.add(&report.resources[&ImpactSourceId::from("network")]).unwrap();
    assert!(by_subtask.approx_eq(&report.total, 1e-9));

    for category in ImpactCategory::ALL {
        let direct = estimator.category_impact(&project, category).unwrap();
        let from_total = report.total.category_total(category).unwrap();
        assert!(direct.approx_eq(&from_total, 1e-9), "{} does not reconcile", category);
    }
}

#[test]
fn test_builtin_people_combine_office_and_transportation() {
    let catalog = Catalog::builtin().unwrap();
    let mut task = Task::new("team");
    task.add_resource(
        Resource::new("team", "people", q("3 people"))
            .with_period(q("2 day"))
            .unwrap(),
    );
    let total = task
        .get_category_impact(ImpactCategory::ClimateChange, &catalog, &ImpactConstants::default())
        .unwrap();
    assert!(total.approx_eq(&q("72.041352 kg_co2e"), 1e-9));
}

#[test]
fn test_builtin_server_electricity_uses_constants() {
    let catalog = Catalog::builtin().unwrap();
    let mut task = Task::new("hosting");
    task.add_resource(
        Resource::new("server", "server", q("1 server"))
            .with_period(q("1 day"))
            .unwrap(),
    );

    let usage_with = |constants: &ImpactConstants| {
        task.get_environmental_impact(&catalog, constants)
            .unwrap()
            .get(ImpactCategory::ClimateChange)
            .and_then(|v| v.usage.clone())
            .unwrap()
    };

    let default_usage = usage_with(&ImpactConstants::default());
    assert!(default_usage.approx_eq(&q("1.81180728 kg_co2e"), 1e-9));

    let efficient = ImpactConstants::default().with_pue(1.0);
    let efficient_usage = usage_with(&efficient);
    assert!(efficient_usage.approx_eq(&(&default_usage / 1.5), 1e-9));
}

#[test]
fn test_builtin_cloud_instance_is_a_quarter_server() {
    let catalog = Catalog::builtin().unwrap();
    let constants = ImpactConstants::default();

    let mut cloud = Task::new("cloud");
    cloud.add_resource(
        Resource::new("vm", "cloud_instance", q("4 server"))
            .with_period(q("1 month"))
            .unwrap(),
    );
    let mut metal = Task::new("metal");
    metal.add_resource(
        Resource::new("box", "server", q("1 server"))
            .with_period(q("1 month"))
            .unwrap(),
    );

    let cloud_impact = cloud.get_environmental_impact(&catalog, &constants).unwrap();
    let metal_impact = metal.get_environmental_impact(&catalog, &constants).unwrap();
    assert!(cloud_impact.approx_eq(&metal_impact, 1e-9));
}

#[test]
fn test_reparent_and_remove_change_the_estimate() {
    let catalog = mock_catalog();
    let estimator = Estimator::new(&catalog, EngineConfig::default()).unwrap();

    let mut project = Task::new("project");
    let a = project.add_subtask(Task::new("a"));
    let b = project.add_subtask(Task::new("b"));
    estimator.add_resource(&mut project, a, one_server()).unwrap();
    estimator.add_resource(&mut project, b, one_server()).unwrap();

    project.reparent(b, a).unwrap();
    let report = estimator.estimate(&project).unwrap();
    assert_eq!(report.subtasks.len(), 1);
    assert_eq!(
        report.subtasks[&a]
            .category_total(ImpactCategory::ClimateChange)
            .unwrap(),
        q("3552 kg_co2e")
    );

    assert!(matches!(
        project.reparent(a, b),
        Err(EngineError::ReparentCycle { .. })
    ));

    project.remove_subtask(a).unwrap();
    let total = estimator
        .category_impact(&project, ImpactCategory::ClimateChange)
        .unwrap();
    assert_eq!(total, Quantity::zero(kg_co2e()));
}

#[test]
fn test_task_document_round_trip() {
    let catalog = Catalog::builtin().unwrap();
    let json = r#"{
        "name": "website",
        "resources": [
            {"name": "visits", "impact_source_id": "network", "amount": "500 gigabyte"}
        ],
        "subtasks": [
            {
                "name": "hosting",
                "resources": [
                    {"name": "vm", "impact_source_id": "cloud_instance", "amount": "2 server", "period": "1 year"}
                ]
            }
        ]
    }"#;
    let task: Task = serde_json::from_str(json).unwrap();
    let estimator = Estimator::new(&catalog, EngineConfig::strict()).unwrap();
    let report = estimator.estimate(&task).unwrap();

    let serialized = serde_json::to_string(&report).unwrap();
    let back: footprint_engine::TaskImpact = serde_json::from_str(&serialized).unwrap();
    assert_eq!(back.task_id, report.task_id);
    assert!(back.total.approx_eq(&report.total, 1e-12));

    let summary = report.summary().unwrap();
    let climate = &summary[&ImpactCategory::ClimateChange];
    assert_eq!(climate.unit, "kg_co2e");
    assert!(climate.value > 0.0);
}
