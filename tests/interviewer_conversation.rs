//! End-to-end conversations driven through the public API with a
//! scripted chat model.

use std::sync::Arc;

use serde_json::json;

use colloquy::adapters::chat::ScriptedChatModel;
use colloquy::adapters::checkpoint::InMemoryCheckpointStore;
use colloquy::domain::conversation::ToolInvocation;
use colloquy::ports::ModelTurn;
use colloquy::{CastSpec, Interview, Interviewer, InterviewerError, InterviewerOptions, PrimitiveKind, ThreadId};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn interviewer_with(
    interview: Interview,
    model: &Arc<ScriptedChatModel>,
    store: &Arc<InMemoryCheckpointStore>,
    thread_id: &ThreadId,
) -> Interviewer {
    let options = InterviewerOptions::default()
        .with_thread_id(thread_id.clone())
        .with_chat_model(model.clone())
        .with_checkpoint_store(store.clone());
    Interviewer::new(interview, options).expect("construction must succeed")
}

fn scripted(turns: impl IntoIterator<Item = ModelTurn>) -> Arc<ScriptedChatModel> {
    Arc::new(ScriptedChatModel::new(turns))
}

fn update_call(tool: &str, arguments: serde_json::Value) -> ModelTurn {
    ModelTurn::with_tool_calls(
        "",
        vec![ToolInvocation::new("call_1", tool, arguments)],
    )
}

#[tokio::test]
async fn empty_interview_concludes_on_the_first_round() {
    init_tracing();
    let interview = Interview::builder("Empty").build().unwrap();
    let model = scripted([]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    // enough == done == true right after initialize, so the first round
    // routes straight to teardown without ever calling the model.
    let reply = interviewer.go(None).await.unwrap();
    assert_eq!(reply, "");
    assert!(model.invocations().is_empty());

    let collected = interviewer.interview().await;
    assert!(collected.enough());
    assert!(collected.done());

    // Further rounds are no-ops on a concluded conversation.
    let reply = interviewer.go(None).await.unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn single_field_conversation_runs_to_completion() {
    init_tracing();
    let interview = Interview::builder("Survey").field("name").build().unwrap();
    let model = scripted([
        ModelTurn::message("What is your name?"),
        ModelTurn::with_tool_calls(
            "Thanks, that is everything I needed!",
            vec![ToolInvocation::new(
                "call_1",
                "update_survey",
                json!({"name": {"value": "Alice"}}),
            )],
        ),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    let opening = interviewer.go(None).await.unwrap();
    assert_eq!(opening, "What is your name?");
    assert!(!interviewer.interview().await.done());

    // The model records the field; digestion has nothing to do; the
    // round ends at teardown.
    let closing = interviewer.go(Some("I'm Alice")).await.unwrap();
    assert_eq!(closing, "Thanks, that is everything I needed!");

    let collected = interviewer.interview().await;
    assert_eq!(collected.value("name").unwrap().natural(), "Alice");
    assert!(collected.done());
    assert_eq!(model.remaining_turns(), 0);
}

#[tokio::test]
async fn first_round_rejects_user_input() {
    init_tracing();
    let interview = Interview::builder("Survey").field("name").build().unwrap();
    let model = scripted([]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    let result = interviewer.go(Some("hello")).await;
    assert!(matches!(result, Err(InterviewerError::UnexpectedUserInput)));
}

#[tokio::test]
async fn resumed_round_requires_user_input() {
    init_tracing();
    let interview = Interview::builder("Survey").field("name").build().unwrap();
    let model = scripted([ModelTurn::message("What is your name?")]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    let result = interviewer.go(None).await;
    assert!(matches!(result, Err(InterviewerError::MissingUserInput)));
}

#[tokio::test]
async fn confidential_field_is_digested_with_a_not_discussed_marker() {
    init_tracing();
    let interview = Interview::builder("Survey")
        .field("name")
        .field("mood")
        .desc("How the respondent seems to feel")
        .confidential()
        .cast(
            "as_cheerful",
            CastSpec::new(PrimitiveKind::Bool, "INTERNAL cheerfulness classifier"),
        )
        .build()
        .unwrap();

    let model = scripted([
        ModelTurn::message("What is your name?"),
        ModelTurn::with_tool_calls(
            "Got it, thanks!",
            vec![ToolInvocation::new(
                "call_1",
                "update_survey",
                json!({"name": {"value": "Alice"}, "mood": null}),
            )],
        ),
        update_call(
            "update_confidential_survey",
            json!({"mood": {"value": "N/A", "as_cheerful": false}}),
        ),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    let closing = interviewer.go(Some("I'm Alice")).await.unwrap();
    assert_eq!(closing, "Got it, thanks!");

    let collected = interviewer.interview().await;
    assert_eq!(collected.value("mood").unwrap().natural(), "N/A");
    assert_eq!(collected.value("mood").unwrap().cast_as_bool("as_cheerful"), Some(false));
    assert!(collected.done());

    // The digestion call bound the confidential-resolve tool and its
    // instruction listed the field - but never the cast prompt.
    let invocations = model.invocations();
    assert_eq!(invocations.len(), 3);
    assert_eq!(invocations[2].bound_tools, ["update_confidential_survey"]);
    assert_eq!(invocations[2].system_texts.len(), 2);
    assert!(invocations[2].system_texts[1].contains("mood"));
    for invocation in &invocations {
        for text in &invocation.system_texts {
            assert!(!text.contains("INTERNAL cheerfulness classifier"));
        }
    }
}

#[tokio::test]
async fn conclude_field_is_synthesized_at_the_end() {
    init_tracing();
    let interview = Interview::builder("Survey")
        .field("name")
        .field("verdict")
        .desc("Overall impression of the respondent")
        .conclude()
        .build()
        .unwrap();

    let model = scripted([
        ModelTurn::message("What is your name?"),
        ModelTurn::with_tool_calls(
            "Wonderful, we're done!",
            vec![ToolInvocation::new(
                "call_1",
                "update_survey",
                json!({"name": {"value": "Alice"}}),
            )],
        ),
        update_call("conclude_survey", json!({"verdict": {"value": "positive"}})),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    interviewer.go(Some("I'm Alice")).await.unwrap();

    let collected = interviewer.interview().await;
    assert_eq!(collected.value("verdict").unwrap().natural(), "positive");
    assert!(collected.done());

    let invocations = model.invocations();
    assert_eq!(invocations.len(), 3);
    // The empty confidential pass moves straight on to the conclude pass.
    assert_eq!(invocations[2].bound_tools, ["conclude_survey"]);
}

#[tokio::test]
async fn model_mistakes_are_handled_conversationally() {
    init_tracing();
    let interview = Interview::builder("Survey").field("name").build().unwrap();
    let model = scripted([
        ModelTurn::message("What is your name?"),
        // The model invents a field; the processor captures the error
        // into a tool result instead of failing the round.
        update_call("update_survey", json!({"nickname": {"value": "Al"}})),
        ModelTurn::message("Sorry, let me try that again - what is your name?"),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    let reply = interviewer.go(Some("Call me Al")).await.unwrap();

    assert_eq!(reply, "Sorry, let me try that again - what is your name?");
    assert!(!interviewer.interview().await.is_set("name"));

    // The retry call saw the failed tool result in the transcript:
    // system, user, assistant(tool call), tool(error) = 5 with the reply.
    let invocations = model.invocations();
    assert_eq!(invocations.len(), 3);
    assert_eq!(invocations[2].message_count, 5);
}

#[tokio::test]
async fn conversation_resumes_from_checkpoint_across_instances() {
    init_tracing();
    let template = Interview::builder("Survey").field("name").build().unwrap();
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::parse("resume-test").unwrap();

    let model = scripted([
        ModelTurn::message("What is your name?"),
        ModelTurn::with_tool_calls(
            "All done!",
            vec![ToolInvocation::new(
                "call_1",
                "update_survey",
                json!({"name": {"value": "Alice"}}),
            )],
        ),
    ]);

    {
        let interviewer = interviewer_with(template.clone(), &model, &store, &thread_id);
        let opening = interviewer.go(None).await.unwrap();
        assert_eq!(opening, "What is your name?");
    }

    // A second interviewer over the same thread picks up where the first
    // stopped - same store, same checkpoint.
    let resumed = interviewer_with(template, &model, &store, &thread_id);
    let closing = resumed.go(Some("I'm Alice")).await.unwrap();
    assert_eq!(closing, "All done!");
    assert_eq!(resumed.interview().await.value("name").unwrap().natural(), "Alice");
}

#[tokio::test]
async fn digestion_runs_at_most_once_and_later_updates_are_ordinary() {
    init_tracing();
    let interview = Interview::builder("Survey")
        .field("name")
        .field("verdict")
        .conclude()
        .build()
        .unwrap();

    let model = scripted([
        ModelTurn::message("What is your name?"),
        // Fills the only ordinary field, making `enough` true.
        update_call("update_survey", json!({"name": {"value": "Alice"}})),
        // The conclude pass answers with text instead of the tool call.
        ModelTurn::message("Let me reflect on that."),
        // The model then re-sends the already-set field: an ordinary
        // update (last write wins), not another digestion.
        update_call("update_survey", json!({"name": {"value": "Alice Smith"}})),
        ModelTurn::message("All set."),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    let reply = interviewer.go(Some("I'm Alice")).await.unwrap();
    assert_eq!(reply, "All set.");

    let collected = interviewer.interview().await;
    assert_eq!(collected.value("name").unwrap().natural(), "Alice Smith");
    assert!(!collected.done());

    // The conclude tool was bound exactly once even though `enough`
    // stayed true the whole time; the confidential pass had nothing to
    // resolve and was never bound at all.
    let bound: Vec<_> = model
        .invocations()
        .into_iter()
        .flat_map(|invocation| invocation.bound_tools)
        .collect();
    assert_eq!(
        bound.iter().filter(|name| *name == "conclude_survey").count(),
        1
    );
    assert!(!bound.iter().any(|name| name == "update_confidential_survey"));
}

#[tokio::test]
async fn end_jumps_straight_to_teardown() {
    init_tracing();
    let interview = Interview::builder("Survey").field("name").build().unwrap();
    let model = scripted([ModelTurn::message("What is your name?")]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    interviewer.end().await.unwrap();

    // The conversation is over; further rounds perform no turns and the
    // model is never called again.
    let reply = interviewer.go(None).await.unwrap();
    assert_eq!(reply, "What is your name?");
    assert_eq!(model.invocations().len(), 1);
}

#[tokio::test]
async fn cast_results_flow_into_typed_accessors() {
    init_tracing();
    let interview = Interview::builder("Numbers")
        .field("favorite")
        .as_int()
        .as_lang("fr")
        .as_one("parity", ["even", "odd"])
        .build()
        .unwrap();

    let model = scripted([
        ModelTurn::message("What is your favorite number?"),
        ModelTurn::with_tool_calls(
            "A classic choice!",
            vec![ToolInvocation::new(
                "call_1",
                "update_numbers",
                json!({"favorite": {
                    "value": "42",
                    "as_int": 42,
                    "as_lang_fr": "quarante-deux",
                    "choose_exactly_one_parity": "even"
                }}),
            )],
        ),
    ]);
    let store = Arc::new(InMemoryCheckpointStore::new());
    let thread_id = ThreadId::new();
    let interviewer = interviewer_with(interview, &model, &store, &thread_id);

    interviewer.go(None).await.unwrap();
    interviewer.go(Some("42, obviously")).await.unwrap();

    let collected = interviewer.interview().await;
    let favorite = collected.value("favorite").unwrap();
    assert_eq!(favorite.natural(), "42");
    assert_eq!(favorite.cast_as_int("as_int"), Some(42));
    assert_eq!(favorite.cast_as_str("as_lang_fr"), Some("quarante-deux"));
    // The legacy cardinality key was normalized on the way in.
    assert_eq!(favorite.cast_as_str("as_one_parity"), Some("even"));
}
