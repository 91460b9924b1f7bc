use super::*;
use arena_runner::Agent;

#[test]
fn provider_names_parse_case_insensitively() {
    assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
    assert_eq!("openrouter".parse::<Provider>().unwrap(), Provider::OpenRouter);
    assert_eq!(" Gemini ".parse::<Provider>().unwrap(), Provider::Gemini);
}

#[test]
fn unknown_provider_is_rejected() {
    let err = "Anthropic".parse::<Provider>().unwrap_err();
    assert!(err.to_string().contains("unknown provider 'Anthropic'"));
}

#[test]
fn spec_defaults() {
    let spec = AgentSpec::new(Provider::OpenAi, "gpt-4o-mini");
    assert_eq!(spec.name, "gpt-4o-mini");
    assert_eq!(spec.timeout, DEFAULT_TIMEOUT);
    assert_eq!(spec.base_url(), "https://api.openai.com/v1");
}

#[test]
fn missing_key_fails_to_build() {
    let spec = AgentSpec::new(Provider::OpenRouter, "openai/gpt-4o");
    let err = build_agent(&spec, &Credentials::default()).err().unwrap();
    assert!(err.to_string().contains("OPENROUTER_API_KEY"));
}

#[test]
fn agent_is_built_with_its_configured_name() {
    let mut spec = AgentSpec::new(Provider::Gemini, "gemini-2.5-flash");
    spec.name = "flash".into();
    let credentials = Credentials::default().with(Provider::Gemini, "key");
    assert_eq!(credentials.key_for(Provider::Gemini), Some("key"));
    assert_eq!(credentials.key_for(Provider::OpenAi), None);

    let agent = build_agent(&spec, &credentials).unwrap();
    assert_eq!(agent.name(), "flash");
}
