//! Verify option derivation and form encoding against JSON test vectors
//! stored in `test-vectors/`.
//!
//! The transport here never touches the network; it accepts the option map
//! and reports an empty successful transfer, so only the option-derivation
//! rules are under test.

use std::collections::BTreeMap;

use request_core::{
    FormOptionParser, HttpMethod, InitializeError, Metadata, OptionParser, OptionValue, Options, Params, Request,
    RequestOption, Transport,
};
use serde::Deserialize;

/// Transport that accepts everything and transfers nothing.
#[derive(Default)]
struct NullTransport {
    open: bool,
}

impl Transport for NullTransport {
    fn initialize(&mut self) -> Result<(), InitializeError> {
        self.open = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.open
    }

    fn set_option(&mut self, _key: RequestOption, _value: &OptionValue) -> Result<bool, InitializeError> {
        Ok(true)
    }

    fn set_options(&mut self, _options: &Options) -> Result<bool, InitializeError> {
        Ok(true)
    }

    fn send_request(&mut self, _options: &Options) -> Result<Option<Vec<u8>>, InitializeError> {
        self.open = true;
        Ok(Some(Vec::new()))
    }

    fn response(&self) -> Option<&[u8]> {
        None
    }

    fn request_info(&self) -> Metadata {
        Metadata::new()
    }

    fn error_code(&self) -> i32 {
        0
    }

    fn error_description(&self) -> String {
        String::new()
    }

    fn error(&self) -> String {
        "No error".to_string()
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn url_encode(&self, input: &str) -> String {
        input.to_string()
    }

    fn url_decode(&self, input: &str) -> String {
        input.to_string()
    }

    fn reset(&mut self) -> Result<(), InitializeError> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct Step {
    method: String,
    url: String,
    data: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct DerivationCase {
    name: String,
    steps: Vec<Step>,
    expected_options: BTreeMap<String, OptionValue>,
}

#[derive(Deserialize)]
struct EncodingCase {
    name: String,
    url: String,
    data: Vec<(String, String)>,
    expected_url: String,
    expected_data: String,
}

#[derive(Deserialize)]
struct Vectors<T> {
    cases: Vec<T>,
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_option(name: &str) -> RequestOption {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .unwrap_or_else(|e| panic!("unknown option {name}: {e}"))
}

// ---------------------------------------------------------------------------
// Option derivation
// ---------------------------------------------------------------------------

#[test]
fn option_derivation_vectors() {
    let raw = include_str!("../../test-vectors/option_derivation.json");
    let vectors: Vectors<DerivationCase> = serde_json::from_str(raw).unwrap();

    for case in vectors.cases {
        let name = &case.name;
        let mut request = Request::with_transport(NullTransport::default());

        for step in &case.steps {
            let data: Params = step.data.iter().cloned().collect();
            let headers: Params = step.headers.iter().cloned().collect();
            request
                .request(parse_method(&step.method), &step.url, &data, &headers)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }

        let expected: Options = case
            .expected_options
            .into_iter()
            .map(|(k, v)| (parse_option(&k), v))
            .collect();
        assert_eq!(request.options(), &expected, "{name}: options");
        assert!(!request.transport().is_initialized(), "{name}: transport left open");
    }
}

// ---------------------------------------------------------------------------
// Form encoding
// ---------------------------------------------------------------------------

#[test]
fn form_encoding_vectors() {
    let raw = include_str!("../../test-vectors/form_encoding.json");
    let vectors: Vectors<EncodingCase> = serde_json::from_str(raw).unwrap();

    let parser = FormOptionParser;
    for case in vectors.cases {
        let name = &case.name;
        let data: Params = case.data.into_iter().collect();
        assert_eq!(parser.parse_url(&case.url, &data), case.expected_url, "{name}: url");
        assert_eq!(parser.parse_data(&data), case.expected_data, "{name}: data");
    }
}
