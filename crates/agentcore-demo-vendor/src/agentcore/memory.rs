//! Memory control and data plane calls.

use agentcore_demo_core::{
    MemoryApi, VendorError,
    api::{ConversationTurn, CreateMemory, MemoryDescriptor, MemoryEvent, MemoryRecord},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;

use super::{
    client::{HttpVendor, Plane},
    protocol::{
        CreateEventRequest, CreateMemoryRequest, EventEnvelope, EventList, MemoryEnvelope,
        MemoryList, RecordList, WirePayload,
    },
};

#[async_trait]
impl MemoryApi for HttpVendor {
    async fn create_memory(&self, request: &CreateMemory) -> Result<MemoryDescriptor, VendorError> {
        let body = CreateMemoryRequest::from_domain(request, uuid::Uuid::new_v4().to_string());
        let url = self.url(Plane::Control, &["memories", "create"])?;
        tracing::info!(name = %request.name, strategies = request.strategies.len(), "creating memory");

        let envelope: MemoryEnvelope = self
            .send_json(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(envelope.memory.into())
    }

    async fn get_memory(&self, memory_id: &str) -> Result<MemoryDescriptor, VendorError> {
        let url = self.url(Plane::Control, &["memories", memory_id, "details"])?;
        let envelope: MemoryEnvelope = self.send_json(self.request(Method::GET, url)).await?;
        Ok(envelope.memory.into())
    }

    async fn list_memories(&self, max_results: u32) -> Result<Vec<MemoryDescriptor>, VendorError> {
        let url = self.url(Plane::Control, &["memories"])?;
        let list: MemoryList = self
            .send_json(
                self.request(Method::POST, url)
                    .json(&json!({ "maxResults": max_results })),
            )
            .await?;
        Ok(list.memories.into_iter().map(Into::into).collect())
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<(), VendorError> {
        let url = self.url(Plane::Control, &["memories", memory_id, "delete"])?;
        tracing::info!(memory_id, "deleting memory");
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    async fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<MemoryEvent, VendorError> {
        let body = CreateEventRequest {
            actor_id: actor_id.to_string(),
            session_id: session_id.to_string(),
            event_timestamp: Utc::now().timestamp(),
            payload: turns.iter().map(WirePayload::from).collect(),
        };
        let url = self.url(Plane::Data, &["memories", memory_id, "events"])?;

        let envelope: EventEnvelope = self
            .send_json(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(envelope.event.into())
    }

    async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryEvent>, VendorError> {
        let url = self.url(
            Plane::Data,
            &["memories", memory_id, "actor", actor_id, "sessions", session_id],
        )?;
        let list: EventList = self
            .send_json(self.request(Method::POST, url).json(&json!({
                "includePayloads": true,
                "maxResults": max_results,
            })))
            .await?;
        Ok(list.events.into_iter().map(Into::into).collect())
    }

    async fn retrieve_records(
        &self,
        memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError> {
        let url = self.url(Plane::Data, &["memories", memory_id, "retrieve"])?;
        let list: RecordList = self
            .send_json(self.request(Method::POST, url).json(&json!({
                "namespace": namespace,
                "searchCriteria": { "searchQuery": query, "topK": top_k },
            })))
            .await?;
        Ok(list
            .memory_record_summaries
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_records(
        &self,
        memory_id: &str,
        namespace: &str,
        max_results: u32,
    ) -> Result<Vec<MemoryRecord>, VendorError> {
        let url = self.url(Plane::Data, &["memories", memory_id, "memoryRecords"])?;
        let list: RecordList = self
            .send_json(self.request(Method::POST, url).json(&json!({
                "namespace": namespace,
                "maxResults": max_results,
            })))
            .await?;
        Ok(list
            .memory_record_summaries
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use agentcore_demo_core::{
        ResourceStatus,
        api::{Role, StrategySpec},
    };
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;
    use crate::VendorConfig;

    fn vendor(server: &MockServer) -> HttpVendor {
        let config = VendorConfig::default()
            .single_endpoint(server.uri())
            .bearer_token(Some("secret"));
        HttpVendor::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_create_memory_sends_strategies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/memories/create"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({ "eventExpiryDuration": 30 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "memory": {
                    "id": "mem-123",
                    "arn": "arn:aws:bedrock-agentcore:us-east-1:1:memory/mem-123",
                    "status": "CREATING",
                    "strategies": [
                        {"strategyId": "s-1", "name": "semantic_facts", "type": "SEMANTIC"}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateMemory {
            name: "ltm_demo".into(),
            description: "demo".into(),
            event_expiry_days: 30,
            strategies: vec![StrategySpec::semantic_facts()],
        };
        let memory = vendor(&server).create_memory(&request).await.unwrap();
        assert_eq!(memory.id, "mem-123");
        assert_eq!(memory.status, ResourceStatus::Creating);
        assert_eq!(memory.strategies[0].strategy_id, "s-1");
    }

    #[tokio::test]
    async fn test_delete_unknown_memory_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/memories/missing/delete"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "message": "Memory not found" })),
            )
            .mount(&server)
            .await;

        let err = vendor(&server).delete_memory("missing").await.unwrap_err();
        assert_eq!(err, VendorError::NotFound("Memory not found".into()));
    }

    #[tokio::test]
    async fn test_create_event_and_list_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/memories/mem-1/events"))
            .and(body_partial_json(json!({ "actorId": "user-1", "sessionId": "conv-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "event": { "eventId": "ev-1", "sessionId": "conv-1", "eventTimestamp": 1_700_000_000 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/memories/mem-1/actor/user-1/sessions/conv-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [{
                    "eventId": "ev-1",
                    "payload": [
                        {"conversational": {"content": {"text": "hi"}, "role": "USER"}},
                        {"conversational": {"content": {"text": "hello"}, "role": "ASSISTANT"}}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let vendor = vendor(&server);
        let turns = [ConversationTurn::user("hi"), ConversationTurn::assistant("hello")];
        let event = vendor
            .create_event("mem-1", "user-1", "conv-1", &turns)
            .await
            .unwrap();
        assert_eq!(event.event_id, "ev-1");

        let events = vendor
            .list_events("mem-1", "user-1", "conv-1", 10)
            .await
            .unwrap();
        assert_eq!(events[0].turns.len(), 2);
        assert_eq!(events[0].turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_retrieve_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/memories/mem-1/retrieve"))
            .and(body_partial_json(json!({ "searchCriteria": { "topK": 5 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "memoryRecordSummaries": [
                    {"memoryRecordId": "r-1", "content": {"text": "likes tea"}, "score": 0.9}
                ]
            })))
            .mount(&server)
            .await;

        let records = vendor(&server)
            .retrieve_records("mem-1", "/strategies/s-1/actors/user-1", "drinks", 5)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "likes tea");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/memories/mem-1/details"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = vendor(&server).get_memory("mem-1").await.unwrap_err();
        assert!(matches!(err, VendorError::Decode(_)));
    }
}
