use super::*;
use crate::infra::resources::iam::{Role, ServicePrincipal};
use crate::infra::resources::{ApiKey, UsagePlan};

fn role() -> Role {
    Role::new(ServicePrincipal::new("ec2.amazonaws.com"))
}

#[test]
fn test_empty_graph() {
    let graph = ResourceGraph::new();
    assert_eq!(graph.node_count(), 0);
    assert!(!graph.has_cycles());
    assert!(graph.topological_order().unwrap().is_empty());
}

#[test]
fn test_declare_returns_handle_with_derived_id() {
    let mut graph = ResourceGraph::new();
    let handle = graph.declare("InstanceRole", role()).unwrap();

    assert_eq!(handle.construct_id, "InstanceRole");
    assert_eq!(handle.kind, ResourceKind::Role);
    assert_eq!(
        handle.logical_id,
        LogicalId::from_path(&["InstanceRole", "Resource"])
    );
    assert_eq!(handle.reference(), Expr::Ref(handle.logical_id.clone()));
    assert!(graph.get(&handle.logical_id).is_some());
    assert_eq!(graph.find("InstanceRole").unwrap().kind(), ResourceKind::Role);
}

#[test]
fn test_duplicate_construct_is_rejected() {
    let mut graph = ResourceGraph::new();
    graph.declare("InstanceRole", role()).unwrap();
    let err = graph.declare("InstanceRole", role()).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateConstruct { .. }));
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_reference_to_undeclared_resource_is_rejected() {
    let mut graph = ResourceGraph::new();
    let phantom = ResourceRef {
        construct_id: "Key".to_string(),
        logical_id: LogicalId::from_path(&["Key", "Resource"]),
        kind: ResourceKind::ApiKey,
    };
    let err = graph
        .declare("Plan", UsagePlan::new("plan").add_api_key(&phantom))
        .unwrap_err();
    assert!(matches!(err, GraphError::UndeclaredReference { .. }));
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_references_become_edges_and_order_dependencies_first() {
    let mut graph = ResourceGraph::new();
    let plan_key = graph.declare("Key", ApiKey::new("key")).unwrap();
    let other_key = graph.declare("OtherKey", ApiKey::new("other")).unwrap();
    let plan = graph
        .declare(
            "Plan",
            UsagePlan::new("plan")
                .add_api_key(&plan_key)
                .add_api_key(&other_key)
                .add_api_key(&plan_key),
        )
        .unwrap();

    // Repeated references collapse into one edge
    assert_eq!(graph.edge_count(), 2);
    assert!(!graph.has_cycles());

    let order: Vec<&str> = graph
        .topological_order()
        .unwrap()
        .into_iter()
        .map(|decl| decl.construct_id.as_str())
        .collect();
    assert_eq!(order.last(), Some(&"Plan"));

    let dependents = graph.dependents(&plan_key.logical_id).unwrap();
    assert_eq!(dependents.len(), 1);
    assert_eq!(dependents[0].logical_id, plan.logical_id);

    let dependencies = graph.dependencies(&plan.logical_id).unwrap();
    assert_eq!(dependencies.len(), 2);
    assert!(dependencies.iter().all(|(_, reference)| *reference == Reference::Identity));
}

#[test]
fn test_counts_by_kind() {
    let mut graph = ResourceGraph::new();
    graph.declare("RoleA", role()).unwrap();
    graph.declare("RoleB", role()).unwrap();
    graph.declare("Key", ApiKey::new("key")).unwrap();

    assert_eq!(graph.count_of(ResourceKind::Role), 2);
    assert_eq!(graph.count_of(ResourceKind::ApiKey), 1);
    assert_eq!(graph.count_of(ResourceKind::Pipeline), 0);

}

#[test]
fn test_unknown_id_lookups_return_none() {
    let graph = ResourceGraph::new();
    let id = LogicalId::from_path(&["Missing", "Resource"]);
    assert!(graph.get(&id).is_none());
    assert!(graph.dependencies(&id).is_none());
    assert!(graph.dependents(&id).is_none());
}

#[test]
fn test_declaration_order_never_forms_cycles() {
    let mut graph = ResourceGraph::new();
    let key = graph.declare("Key", ApiKey::new("key")).unwrap();
    graph
        .declare("Plan", UsagePlan::new("plan").add_api_key(&key))
        .unwrap();
    assert!(graph.detect_cycle().is_none());
}

#[test]
fn test_topological_order_follows_declaration_order() {
    let mut graph = ResourceGraph::new();
    graph.declare("RoleA", role()).unwrap();
    let key = graph.declare("Key", ApiKey::new("key")).unwrap();
    graph
        .declare("Plan", UsagePlan::new("plan").add_api_key(&key))
        .unwrap();
    graph.declare("RoleB", role()).unwrap();
    graph.declare("OtherKey", ApiKey::new("other")).unwrap();

    let order: Vec<&str> = graph
        .topological_order()
        .unwrap()
        .into_iter()
        .map(|decl| decl.construct_id.as_str())
        .collect();
    assert_eq!(order, ["RoleA", "Key", "Plan", "RoleB", "OtherKey"]);

    let declared: Vec<&str> = graph
        .declarations()
        .map(|decl| decl.construct_id.as_str())
        .collect();
    assert_eq!(order, declared);
}

#[test]
fn test_construct_ids_with_path_separator_are_rejected() {
    let mut graph = ResourceGraph::new();

    for construct_id in ["CiCdPipeline/Role", "", "/"] {
        let err = graph.declare(construct_id, role()).unwrap_err();
        assert!(
            matches!(err, GraphError::InvalidConstructId { .. }),
            "{construct_id:?} should be rejected"
        );
    }
    assert_eq!(graph.node_count(), 0);
}
