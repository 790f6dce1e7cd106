//! End-to-end lifecycle scenarios against the in-memory control plane.

use std::collections::HashSet;
use std::sync::Arc;

use endpoint_provisioner::error::AppError;
use endpoint_provisioner::models::{
    Completion, CompletionQuery, CompletionStatus, EndpointConfig, ExternalResourceState,
    ProvisioningRequest,
};
use endpoint_provisioner::pipeline::{CompletionPoller, LifecycleHandler};
use endpoint_provisioner::services::{
    ControlPlaneCall, ControlPlaneError, InMemoryControlPlane, RecordedCall,
};
use serde_json::Value;

fn endpoint_config() -> EndpointConfig {
    EndpointConfig {
        name_prefix: "endpoint".to_string(),
        desired_inference_units: 1,
    }
}

fn wire(cp: &Arc<InMemoryControlPlane>) -> (LifecycleHandler, CompletionPoller) {
    (
        LifecycleHandler::new(cp.clone(), endpoint_config()),
        CompletionPoller::new(cp.clone(), true),
    )
}

async fn status(poller: &CompletionPoller, id: &str) -> CompletionStatus {
    CompletionStatus::from(poller.poll(&CompletionQuery::new(id)).await.unwrap())
}

#[tokio::test]
async fn create_polls_creating_three_times_then_in_service() {
    let cp = Arc::new(
        InMemoryControlPlane::new()
            .with_arn_prefix("")
            .with_create_progression(vec![
                ExternalResourceState::Creating,
                ExternalResourceState::Creating,
                ExternalResourceState::Creating,
                ExternalResourceState::InService,
            ]),
    );
    let (handler, poller) = wire(&cp);

    let mut request = ProvisioningRequest::create("unused");
    request.properties.clear();
    request
        .properties
        .insert("modelReference".to_string(), Value::from("model-A"));

    let result = handler.handle(&request).await.unwrap();
    assert!(result.resource_identifier.starts_with("endpoint-"));

    match &cp.calls()[0] {
        RecordedCall::Create(spec) => {
            assert_eq!(spec.model_arn, "model-A");
            assert_eq!(spec.desired_inference_units, 1);
            assert_eq!(spec.name, result.resource_identifier);
        }
        other => panic!("expected a create call, got {other:?}"),
    }

    for _ in 0..3 {
        assert!(!status(&poller, &result.resource_identifier).await.is_complete);
    }
    assert!(status(&poller, &result.resource_identifier).await.is_complete);
}

#[tokio::test]
async fn repeated_creates_get_distinct_identifiers() {
    let cp = Arc::new(InMemoryControlPlane::new());
    let (handler, _) = wire(&cp);

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let result = handler
            .handle(&ProvisioningRequest::create("arn:classifier/v1"))
            .await
            .unwrap();
        assert!(!result.resource_identifier.is_empty());
        ids.insert(result.resource_identifier);
    }
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn update_is_observed_only_through_polling() {
    let cp = Arc::new(InMemoryControlPlane::new());
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap();
    let id = created.resource_identifier;
    // Creating, then InService
    assert!(!status(&poller, &id).await.is_complete);
    assert!(status(&poller, &id).await.is_complete);

    let updated = handler
        .handle(&ProvisioningRequest::update(&id, "arn:classifier/v2"))
        .await
        .unwrap();
    assert_eq!(updated.resource_identifier, id);

    assert!(!status(&poller, &id).await.is_complete);
    assert!(status(&poller, &id).await.is_complete);
}

#[tokio::test]
async fn delete_is_complete_on_the_very_next_poll() {
    let cp = Arc::new(InMemoryControlPlane::new().with_arn_prefix(""));
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap();
    let id = created.resource_identifier;

    handler
        .handle(&ProvisioningRequest::delete(&id))
        .await
        .unwrap();
    assert!(cp.calls().contains(&RecordedCall::Delete(id.clone())));

    // DELETING counts as done, and so does the endpoint vanishing afterwards.
    assert_eq!(
        poller.poll(&CompletionQuery::new(&id)).await.unwrap(),
        Completion::Ready
    );
    assert_eq!(
        poller.poll(&CompletionQuery::new(&id)).await.unwrap(),
        Completion::NotFound
    );
}

#[tokio::test]
async fn delete_of_unknown_endpoint_then_poll_is_complete() {
    let cp = Arc::new(InMemoryControlPlane::new());
    let (handler, poller) = wire(&cp);

    let result = handler
        .handle(&ProvisioningRequest::delete("endpoint-123"))
        .await
        .unwrap();
    assert_eq!(result.resource_identifier, "endpoint-123");
    assert!(status(&poller, "endpoint-123").await.is_complete);
}

#[tokio::test]
async fn create_submission_error_propagates() {
    let cp = Arc::new(InMemoryControlPlane::new());
    cp.fail_next(
        ControlPlaneCall::Create,
        ControlPlaneError::Service("ResourceLimitExceededException".to_string()),
    );
    let (handler, _) = wire(&cp);

    let err = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ControlPlane {
            operation: "CreateEndpoint",
            ..
        }
    ));
}

#[tokio::test]
async fn describe_error_is_fail_open_by_default() {
    let cp = Arc::new(InMemoryControlPlane::new());
    cp.fail_next(
        ControlPlaneCall::Describe,
        ControlPlaneError::Service("ThrottlingException".to_string()),
    );
    let (_, poller) = wire(&cp);

    assert_eq!(
        poller.poll(&CompletionQuery::new("arn:endpoint/x")).await.unwrap(),
        Completion::NotFound
    );
}

#[tokio::test]
async fn describe_error_surfaces_when_fail_open_disabled() {
    let cp = Arc::new(InMemoryControlPlane::new());
    cp.fail_next(
        ControlPlaneCall::Describe,
        ControlPlaneError::Service("ThrottlingException".to_string()),
    );
    let poller = CompletionPoller::new(cp.clone(), false);

    let err = poller
        .poll(&CompletionQuery::new("arn:endpoint/x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ControlPlane { .. }));

    // Not-found is still a normal outcome.
    assert_eq!(
        poller.poll(&CompletionQuery::new("arn:endpoint/x")).await.unwrap(),
        Completion::NotFound
    );
}

#[tokio::test]
async fn failed_endpoint_is_terminal() {
    let cp = Arc::new(InMemoryControlPlane::new().with_create_progression(vec![
        ExternalResourceState::Creating,
        ExternalResourceState::Failed,
    ]));
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/broken"))
        .await
        .unwrap();
    let query = CompletionQuery::new(&created.resource_identifier);

    assert_eq!(poller.poll(&query).await.unwrap(), Completion::NotReady);
    let err = poller.poll(&query).await.unwrap_err();
    assert!(matches!(err, AppError::EndpointFailed { .. }));
}

#[tokio::test]
async fn update_polls_updating_until_in_service() {
    let cp = Arc::new(InMemoryControlPlane::new().with_update_progression(vec![
        ExternalResourceState::Updating,
        ExternalResourceState::Updating,
        ExternalResourceState::InService,
    ]));
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap();
    let query = CompletionQuery::new(&created.resource_identifier);
    assert_eq!(poller.poll(&query).await.unwrap(), Completion::NotReady);
    assert_eq!(poller.poll(&query).await.unwrap(), Completion::Ready);

    handler
        .handle(&ProvisioningRequest::update(
            &created.resource_identifier,
            "arn:classifier/v2",
        ))
        .await
        .unwrap();
    assert!(cp.calls().contains(&RecordedCall::Update {
        endpoint_arn: created.resource_identifier.clone(),
        model_arn: "arn:classifier/v2".to_string(),
        desired_inference_units: 1,
    }));

    assert_eq!(poller.poll(&query).await.unwrap(), Completion::NotReady);
    assert_eq!(poller.poll(&query).await.unwrap(), Completion::NotReady);
    assert_eq!(poller.poll(&query).await.unwrap(), Completion::Ready);
}

#[tokio::test]
async fn endpoint_removed_out_of_band_still_tears_down() {
    let cp = Arc::new(InMemoryControlPlane::new());
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap();
    let id = created.resource_identifier;
    assert!(cp.forget(&id));

    assert_eq!(
        poller.poll(&CompletionQuery::new(&id)).await.unwrap(),
        Completion::NotFound
    );
    let deleted = handler
        .handle(&ProvisioningRequest::delete(&id))
        .await
        .unwrap();
    assert_eq!(deleted.resource_identifier, id);
    assert!(status(&poller, &id).await.is_complete);
}

#[tokio::test]
async fn endpoint_failing_after_update_reports_reason() {
    let cp = Arc::new(InMemoryControlPlane::new());
    let (handler, poller) = wire(&cp);

    let created = handler
        .handle(&ProvisioningRequest::create("arn:classifier/v1"))
        .await
        .unwrap();
    let id = created.resource_identifier;
    handler
        .handle(&ProvisioningRequest::update(&id, "arn:classifier/v2"))
        .await
        .unwrap();
    assert!(cp.set_state(&id, ExternalResourceState::Failed));

    match poller.poll(&CompletionQuery::new(&id)).await.unwrap_err() {
        AppError::EndpointFailed { arn, reason } => {
            assert_eq!(arn, id);
            assert!(reason.contains("arn:classifier/v2"));
        }
        other => panic!("expected EndpointFailed, got {other:?}"),
    }
}
