use indoc::indoc;

use crate::errors::RouterError;
use crate::models::message::Message;
use crate::providers::base::StopReason;
use crate::providers::router::FallbackRouter;
use crate::toolkit::Toolkit;

pub const DEFAULT_MAX_TURNS: usize = 20;

pub const SYSTEM_PROMPT: &str = indoc! {"
    You are an expert job search agent. Find jobs as soon as they are posted.
    Strategy:
    1. Search job boards for fresh postings (max_days_old=1)
    2. Search Wellfound and Hacker News for startup roles
    3. Find small companies via Maps that post on their own sites
    4. Save every good opportunity using save_job
    5. Give a clear summary of what you found
    Be thorough. Use multiple tools. Always sort by newest first.
"};

/// How a run ended. Running out of turn budget is a normal outcome with a
/// best-effort summary, not an error; everything written by earlier tool
/// calls stays written.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Done {
        summary: String,
        turns: usize,
        tool_invocations: usize,
    },
    Exhausted {
        summary: String,
        turns: usize,
        tool_invocations: usize,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> &str {
        match self {
            RunOutcome::Done { summary, .. } => summary,
            RunOutcome::Exhausted { summary, .. } => summary,
        }
    }

    pub fn tool_invocations(&self) -> usize {
        match self {
            RunOutcome::Done {
                tool_invocations, ..
            } => *tool_invocations,
            RunOutcome::Exhausted {
                tool_invocations, ..
            } => *tool_invocations,
        }
    }
}

/// Agent turns a free-text goal into a bounded sequence of tool calls.
///
/// One turn is one model call plus the execution of whatever tools it asked
/// for. The conversation belongs to a single run and is dropped when the run
/// ends. The loop itself never prints; progress is observable through
/// tracing.
pub struct Agent {
    router: FallbackRouter,
    toolkit: Box<dyn Toolkit>,
    system_prompt: String,
    max_turns: usize,
}

impl Agent {
    pub fn new(router: FallbackRouter, toolkit: Box<dyn Toolkit>) -> Self {
        Self {
            router,
            toolkit,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Which backends are available, for display
    pub fn status(&self) -> String {
        self.router.status()
    }

    /// Drive the goal to completion or to the turn ceiling. The only
    /// unrecoverable failure is the router running out of backends — tool
    /// failures come back as conversational text and the model adapts.
    pub async fn run(&self, goal: &str) -> Result<RunOutcome, RouterError> {
        let mut messages = vec![Message::user().with_text(goal)];
        let tools = self.toolkit.tools();
        let mut tool_invocations = 0;

        for turn in 0..self.max_turns {
            let response = self
                .router
                .chat(&self.system_prompt, &messages, tools)
                .await?;

            if response.stop_reason == StopReason::EndTurn {
                tracing::info!(turns = turn + 1, tool_invocations, "agent run finished");
                return Ok(RunOutcome::Done {
                    summary: response.text,
                    turns: turn + 1,
                    tool_invocations,
                });
            }

            let mut assistant = Message::assistant();
            if !response.text.is_empty() {
                assistant = assistant.with_text(&response.text);
            }
            for request in &response.tool_requests {
                assistant = assistant.with_tool_request(request.id.clone(), request.call.clone());
            }
            messages.push(assistant);

            // Tools run one at a time, in the order the model asked for
            // them, so each response lines up with its request id.
            let mut results = Message::user();
            for request in &response.tool_requests {
                tracing::info!(tool = %request.call.name, turn, "executing tool");
                let output = self.toolkit.execute(&request.call).await;
                tracing::debug!(tool = %request.call.name, output_len = output.len(), "tool finished");
                tool_invocations += 1;
                results = results.with_tool_response(request.id.clone(), output);
            }
            messages.push(results);
        }

        tracing::warn!(
            max_turns = self.max_turns,
            tool_invocations,
            "agent run hit the turn ceiling"
        );
        let summary = format!(
            "Stopped after reaching the {}-turn budget; {} tool invocation(s) completed. \
             Any jobs saved along the way have been kept.",
            self.max_turns, tool_invocations
        );
        Ok(RunOutcome::Exhausted {
            summary,
            turns: self.max_turns,
            tool_invocations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;
    use crate::errors::ProviderError;
    use crate::models::message::ToolRequest;
    use crate::models::tool::{Tool, ToolCall};
    use crate::providers::base::{ChatResponse, Usage};
    use crate::providers::mock::{FailingProvider, MockProvider, RepeatingProvider};
    use crate::store::{JobStatus, JobStore};
    use crate::toolkit::JobToolkit;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    // Mock toolkit that records every call it receives
    struct EchoToolkit {
        tools: Vec<Tool>,
        calls: Arc<Mutex<Vec<ToolCall>>>,
    }

    impl EchoToolkit {
        fn new() -> Self {
            Self {
                tools: vec![Tool::new(
                    "echo",
                    "Echoes back the input",
                    json!({"type": "object", "properties": {"message": {"type": "string"}}, "required": ["message"]}),
                )],
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls_handle(&self) -> Arc<Mutex<Vec<ToolCall>>> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl Toolkit for EchoToolkit {
        fn tools(&self) -> &[Tool] {
            &self.tools
        }

        async fn execute(&self, call: &ToolCall) -> String {
            self.calls.lock().unwrap().push(call.clone());
            match call.name.as_str() {
                "echo" => call.arguments["message"].as_str().unwrap_or("").to_string(),
                other => format!("Unknown tool: {}", other),
            }
        }
    }

    fn router_with(responses: Vec<ChatResponse>) -> FallbackRouter {
        FallbackRouter::new(vec![Box::new(MockProvider::new(responses))]).unwrap()
    }

    fn tool_use(id: &str, name: &str, arguments: serde_json::Value) -> ChatResponse {
        ChatResponse::from_parts(
            "",
            vec![ToolRequest {
                id: id.to_string(),
                call: ToolCall::new(name, arguments),
            }],
            Usage::default(),
        )
    }

    #[tokio::test]
    async fn test_simple_response() {
        let router = router_with(vec![ChatResponse::end_turn("Hello!")]);
        let agent = Agent::new(router, Box::new(EchoToolkit::new()));

        let outcome = agent.run("Hi").await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Done {
                summary: "Hello!".to_string(),
                turns: 1,
                tool_invocations: 0
            }
        );
    }

    #[tokio::test]
    async fn test_tool_call_roundtrip() {
        let router = router_with(vec![
            tool_use("1", "echo", json!({"message": "test"})),
            ChatResponse::end_turn("Done!"),
        ]);
        let toolkit = EchoToolkit::new();
        let calls = toolkit.calls_handle();
        let agent = Agent::new(router, Box::new(toolkit));

        let outcome = agent.run("Echo test").await.unwrap();

        assert_eq!(outcome.summary(), "Done!");
        assert_eq!(outcome.tool_invocations(), 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "echo");
    }

    #[tokio::test]
    async fn test_multiple_tool_calls_execute_in_order() {
        let response = ChatResponse::from_parts(
            "Running both",
            vec![
                ToolRequest {
                    id: "1".to_string(),
                    call: ToolCall::new("echo", json!({"message": "first"})),
                },
                ToolRequest {
                    id: "2".to_string(),
                    call: ToolCall::new("echo", json!({"message": "second"})),
                },
            ],
            Usage::default(),
        );
        let router = router_with(vec![response, ChatResponse::end_turn("All done!")]);
        let toolkit = EchoToolkit::new();
        let calls = toolkit.calls_handle();
        let agent = Agent::new(router, Box::new(toolkit));

        let outcome = agent.run("Multiple calls").await.unwrap();

        assert_eq!(outcome.summary(), "All done!");
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments["message"], "first");
        assert_eq!(calls[1].arguments["message"], "second");
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_abort_the_run() {
        let router = router_with(vec![
            tool_use("1", "invalid_tool", json!({})),
            ChatResponse::end_turn("Recovered"),
        ]);
        let agent = Agent::new(router, Box::new(EchoToolkit::new()));

        let outcome = agent.run("Invalid tool").await.unwrap();

        assert_eq!(outcome.summary(), "Recovered");
        assert_eq!(outcome.tool_invocations(), 1);
    }

    #[tokio::test]
    async fn test_turn_ceiling_yields_exhausted() {
        let always_tool_use = tool_use("1", "echo", json!({"message": "again"}));
        let router =
            FallbackRouter::new(vec![Box::new(RepeatingProvider::new(always_tool_use))]).unwrap();
        let agent = Agent::new(router, Box::new(EchoToolkit::new())).with_max_turns(3);

        let outcome = agent.run("Loop forever").await.unwrap();

        match outcome {
            RunOutcome::Exhausted {
                turns,
                tool_invocations,
                summary,
            } => {
                assert_eq!(turns, 3);
                assert_eq!(tool_invocations, 3);
                assert!(summary.contains("3-turn budget"));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_router_failure_aborts_the_run() {
        let router = FallbackRouter::new(vec![Box::new(FailingProvider::new(
            "groq",
            ProviderError::Auth,
            "invalid api key",
        ))])
        .unwrap();
        let agent = Agent::new(router, Box::new(EchoToolkit::new()));

        let result = agent.run("Anything").await;

        assert!(matches!(result, Err(RouterError::AllProvidersFailed(_))));
    }

    #[tokio::test]
    async fn test_find_one_job_end_to_end() {
        let dir = tempdir().unwrap();
        let store = JobStore::new(dir.path().join("saved_jobs.json"));
        let toolkit = JobToolkit::new(SourcesConfig::default(), store).unwrap();

        let router = router_with(vec![
            tool_use(
                "1",
                "save_job",
                json!({"title": "X", "company": "Y", "source": "Z"}),
            ),
            ChatResponse::end_turn("Done"),
        ]);
        let agent = Agent::new(router, Box::new(toolkit));

        let outcome = agent.run("find 1 job").await.unwrap();

        assert_eq!(outcome.summary(), "Done");

        let store = JobStore::new(dir.path().join("saved_jobs.json"));
        let jobs = store.load().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "X");
        assert_eq!(jobs[0].company, "Y");
        assert_eq!(jobs[0].source, "Z");
        assert_eq!(jobs[0].status, JobStatus::Saved);
    }
}
