use anyhow::Result;
use cliclack::spinner;
use console::style;
use futures::StreamExt;

use gofer::agent::{Agent, RunStatus};
use gofer::errors::AgentError;
use gofer::models::content::render_contents;
use gofer::models::message::{Message, MessageContent};

/// Drives one agent run and renders its progress. Verbose mode shows every
/// tool call and result; quiet mode shows a spinner and the final summary.
pub struct Session {
    agent: Agent,
    verbose: bool,
}

impl Session {
    pub fn new(agent: Agent, verbose: bool) -> Self {
        Session { agent, verbose }
    }

    pub async fn run(&self, task: &str) -> Result<RunStatus> {
        if self.verbose {
            println!("{} {}", style("Task:").bold(), task);
            println!(
                "{} {}",
                style("Max iterations:").bold(),
                self.agent.config().max_iterations
            );
        }

        let seed = vec![Message::user().with_text(task)];
        let mut messages = seed.clone();
        let mut status = RunStatus::Completed;

        let spin = if self.verbose { None } else { Some(spinner()) };
        if let Some(spin) = &spin {
            spin.start("Working on it...");
        }

        {
            let mut stream = self.agent.reply(&seed);
            while let Some(item) = stream.next().await {
                match item {
                    Ok(message) => {
                        if self.verbose {
                            self.render(&message);
                        }
                        messages.push(message);
                    }
                    Err(AgentError::MaxIterationsReached { .. }) => {
                        status = RunStatus::IterationLimit;
                        break;
                    }
                    Err(error) => {
                        if let Some(spin) = &spin {
                            spin.stop("");
                        }
                        return Err(error.into());
                    }
                }
            }
        }

        if let Some(spin) = &spin {
            spin.stop("");
        }

        match status {
            RunStatus::Completed => {
                let summary = self
                    .agent
                    .summarize(&messages)
                    .unwrap_or_else(|| "The agent finished without a summary.".to_string());
                println!("{}", style(summary).green());
            }
            RunStatus::IterationLimit => {
                println!(
                    "{}",
                    style("Maximum iterations reached before the task completed.").yellow()
                );
            }
        }

        Ok(status)
    }

    fn render(&self, message: &Message) {
        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        println!("{}", text.text);
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(call) => println!(
                        "{} {}{}",
                        style("→").cyan(),
                        style(&call.name).cyan().bold(),
                        style(format!(" {}", call.arguments)).dim()
                    ),
                    Err(error) => println!("{} {}", style("✗").red(), error),
                },
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(contents) => {
                        let body = render_contents(contents);
                        let shown = if body.chars().count() > 300 {
                            let preview: String = body.chars().take(300).collect();
                            format!("{}... ({} chars total)", preview, body.chars().count())
                        } else {
                            body
                        };
                        println!("{} {}", style("✓").green(), shown);
                    }
                    Err(error) => println!("{} {}", style("✗").red(), error),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofer::models::tool::ToolCall;
    use gofer::providers::mock::MockProvider;
    use gofer::registry::ToolRegistry;
    use gofer::tools::terminate;
    use gofer::tools::workspace::Workspace;
    use serde_json::json;
    use std::sync::Arc;

    fn test_agent(responses: Vec<Message>, dir: &std::path::Path) -> Agent {
        let mut registry = ToolRegistry::new();
        let workspace = Arc::new(Workspace::new(dir));
        workspace.register_all(&mut registry).unwrap();
        terminate::register(&mut registry).unwrap();
        Agent::new(Box::new(MockProvider::new(responses)), registry)
    }

    #[tokio::test]
    async fn test_scripted_run_completes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi").unwrap();

        let agent = test_agent(
            vec![
                Message::assistant()
                    .with_tool_request("1", Ok(ToolCall::new("list_files", json!({})))),
                Message::assistant().with_tool_request(
                    "2",
                    Ok(ToolCall::new("terminate", json!({"message": "one file found"}))),
                ),
            ],
            dir.path(),
        );

        let session = Session::new(agent, true);
        let status = session.run("list the files").await.unwrap();
        assert_eq!(status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_scripted_run_hits_iteration_cap() {
        let dir = tempfile::tempdir().unwrap();

        let responses: Vec<Message> = (0..4)
            .map(|i| {
                Message::assistant().with_tool_request(
                    format!("{}", i),
                    Ok(ToolCall::new("list_files", json!({}))),
                )
            })
            .collect();
        let agent = test_agent(responses, dir.path()).with_config(gofer::agent::AgentConfig {
            max_iterations: 2,
            ..Default::default()
        });

        let session = Session::new(agent, true);
        let status = session.run("loop").await.unwrap();
        assert_eq!(status, RunStatus::IterationLimit);
    }
}
