//! offer-runner: headless front end for the retention offer policy.
//!
//! Usage:
//!   offer-runner --db customers.db --import data/customers/sample_customers.json
//!   offer-runner --db customers.db --customer 7590-VHVEG --seed 12345
//!   offer-runner --db customers.db --ipc-mode --data-dir ./data

use anyhow::Result;
use retention_core::{
    config::PolicyConfig,
    error::{PolicyError, PolicyResult},
    offer_policy::validate_customer_id,
    ChurnReport, CustomerRecord, CustomerStore, OfferDecision, OfferPolicy, OfferRng,
    RetentionError,
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    QueryChurn {
        #[serde(default)]
        customer_id: String,
    },
    GenerateOffers {
        #[serde(default)]
        customer_id: String,
        #[serde(default)]
        churn_data: Option<Value>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcResponse {
    status: u16,
    body:   Value,
}

impl IpcResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, customer_id: &str, message: impl ToString, source: &str) -> Self {
        Self {
            status,
            body: json!({
                "error":       message.to_string(),
                "customer_id": customer_id,
                "source":      source,
            }),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", clock_seed());
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let customer = flag_value(&args, "--customer");
    let import = flag_value(&args, "--import");

    let policy = match flag_value(&args, "--data-dir") {
        Some(dir) => OfferPolicy::new(PolicyConfig::load(dir)?)?,
        None => OfferPolicy::standard(),
    };

    let store = CustomerStore::open(db)?;
    store.migrate()?;

    if let Some(path) = import {
        let n = import_customers(&store, path)?;
        log::info!("imported {n} customers from {path}");
    }

    if ipc_mode {
        run_ipc_loop(&policy, &store, seed)?;
    } else if let Some(customer_id) = customer {
        let mut rng = OfferRng::new(seed);
        let decision = decide_for_customer(&policy, &store, customer_id, &mut rng)?;
        print_decision(&decision, seed)?;
    } else {
        print_summary(&store, db)?;
    }

    Ok(())
}

fn import_customers(store: &CustomerStore, path: &str) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let records: Vec<CustomerRecord> = serde_json::from_str(&content)?;
    for record in &records {
        store.upsert_customer(record)?;
    }
    Ok(records.len())
}

/// Churn lookup followed by the offer policy, as the agent would chain them.
fn decide_for_customer(
    policy: &OfferPolicy,
    store: &CustomerStore,
    customer_id: &str,
    rng: &mut OfferRng,
) -> Result<OfferDecision> {
    let report = churn_report(store, customer_id)?;
    let decision = policy.generate_offers(
        &report.customer_id,
        &report.profile,
        Some(&report.analysis),
        rng,
    )?;
    Ok(decision)
}

fn churn_report(store: &CustomerStore, customer_id: &str) -> Result<ChurnReport, RetentionError> {
    let customer_id = validate_customer_id(customer_id)?;
    let record = store
        .get_customer(customer_id)?
        .ok_or_else(|| RetentionError::CustomerNotFound {
            customer_id: customer_id.to_string(),
        })?;
    ChurnReport::from_record(&record)
}

fn run_ipc_loop(policy: &OfferPolicy, store: &CustomerStore, seed: u64) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut request_index: u64 = 0;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let response = IpcResponse { status: 400, body: json!({ "error": e.to_string() }) };
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
                continue;
            }
        };

        let response = match request {
            IpcRequest::Quit => break,
            IpcRequest::QueryChurn { customer_id } => handle_query_churn(store, &customer_id),
            IpcRequest::GenerateOffers { customer_id, churn_data } => {
                let mut rng = OfferRng::for_request(seed, request_index);
                request_index += 1;
                handle_generate_offers(policy, &customer_id, churn_data.as_ref(), &mut rng)
            }
        };

        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_query_churn(store: &CustomerStore, customer_id: &str) -> IpcResponse {
    const SOURCE: &str = "churn_data_query";
    log::info!("processing churn data query for customer: {customer_id}");

    match churn_report(store, customer_id) {
        Ok(report) => IpcResponse::ok(json!({
            "customer_id": report.customer_id,
            "churn_data":  report,
            "source":      SOURCE,
        })),
        Err(RetentionError::Policy(e)) => IpcResponse::error(400, customer_id, e, SOURCE),
        Err(e @ RetentionError::CustomerNotFound { .. }) => {
            IpcResponse::error(404, customer_id, e, SOURCE)
        }
        Err(e) => {
            log::error!("churn data query failed for {customer_id}: {e}");
            IpcResponse::error(500, customer_id, e, SOURCE)
        }
    }
}

fn handle_generate_offers(
    policy: &OfferPolicy,
    customer_id: &str,
    churn_data: Option<&Value>,
    rng: &mut OfferRng,
) -> IpcResponse {
    const SOURCE: &str = "retention_offer";
    log::info!("processing retention offer request for customer: {customer_id}");

    let result = validate_customer_id(customer_id)
        .and_then(|_| parse_churn_data(churn_data))
        .and_then(|report| {
            policy.generate_offers(customer_id, &report.profile, Some(&report.analysis), rng)
        });

    match result {
        Ok(decision) => IpcResponse::ok(json!({
            "customer_id":      decision.customer_id,
            "total_offers":     decision.total_offers(),
            "retention_offers": decision,
            "source":           SOURCE,
        })),
        Err(e) => IpcResponse::error(400, customer_id, e, SOURCE),
    }
}

/// `null` and `{}` count as absent; anything that does not decode as a
/// report is malformed.
fn parse_churn_data(churn_data: Option<&Value>) -> PolicyResult<ChurnReport> {
    match churn_data {
        None | Some(Value::Null) => Err(PolicyError::MissingChurnData {
            reason: "Churn data is required".into(),
        }),
        Some(Value::Object(fields)) if fields.is_empty() => Err(PolicyError::MissingChurnData {
            reason: "Churn data is required".into(),
        }),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| PolicyError::MissingChurnData {
            reason: format!("Churn data is malformed: {e}"),
        }),
    }
}

fn print_decision(decision: &OfferDecision, seed: u64) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(decision)?);

    let today = chrono::Local::now().date_naive();
    println!();
    println!("=== OFFERS ({}, seed {seed}) ===", decision.risk_tier);
    for offer in &decision.offers {
        println!(
            "  {:<12} {:<34} {:?}/{:?}  valid until {}",
            offer.code(),
            offer.title(),
            offer.priority(),
            offer.urgency(),
            offer.expires_on(today),
        );
    }
    println!("  action: {}", decision.recommended_action);
    Ok(())
}

fn print_summary(store: &CustomerStore, db: &str) -> Result<()> {
    let customers = store.customer_count()?;

    println!("=== CUSTOMER STORE ===");
    println!("  db:        {db}");
    println!("  customers: {customers}");

    let riskiest = store.riskiest_customers(5)?;
    if riskiest.is_empty() {
        println!("  (no active customers; use --import FILE)");
        return Ok(());
    }
    println!();
    println!("=== HIGHEST CHURN RISK ===");
    for c in riskiest {
        println!(
            "  {:<12} score {:.2}  {:<16} ${:.2}/mo",
            c.customer_id, c.churn_risk_score, c.contract, c.monthly_charges
        );
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retention_core::{ChurnAnalysis, ContractType, CustomerProfile};

    fn report_json(customer_id: &str, score: f64) -> Value {
        let report = ChurnReport {
            customer_id: customer_id.to_string(),
            analysis:    ChurnAnalysis::from_score(score, true),
            profile:     CustomerProfile::new(85.0, 2, ContractType::MonthToMonth),
            insights:    Default::default(),
        };
        serde_json::to_value(report).unwrap()
    }

    fn offers_for(customer_id: &str, churn_data: Option<Value>) -> IpcResponse {
        let mut rng = OfferRng::new(42);
        handle_generate_offers(&OfferPolicy::standard(), customer_id, churn_data.as_ref(), &mut rng)
    }

    fn assert_missing_churn_data(response: &IpcResponse) {
        assert_eq!(response.status, 400, "Expected 400, got {}", response.body);
        assert_eq!(response.body["customer_id"], "C1");
        assert_eq!(response.body["source"], "retention_offer");
        let error = response.body["error"].as_str().unwrap_or_default();
        assert!(error.contains("Churn data"), "Unexpected error text: {error}");
    }

    #[test]
    fn absent_churn_data_is_rejected() {
        assert_missing_churn_data(&offers_for("C1", None));
        assert_missing_churn_data(&offers_for("C1", Some(Value::Null)));
    }

    #[test]
    fn empty_churn_data_is_rejected() {
        assert_missing_churn_data(&offers_for("C1", Some(json!({}))));
    }

    #[test]
    fn malformed_churn_data_is_rejected() {
        let mut report = report_json("C1", 0.9);
        report["analysis"]["risk_score"] = json!("very high");
        assert_missing_churn_data(&offers_for("C1", Some(report)));
        assert_missing_churn_data(&offers_for("C1", Some(json!({ "customer_id": "C1" }))));
    }

    #[test]
    fn blank_customer_id_wins_over_missing_churn_data() {
        let response = offers_for("  ", Some(json!({})));
        assert_eq!(response.status, 400);
        let error = response.body["error"].as_str().unwrap_or_default();
        assert!(error.contains("Customer ID is required"), "Unexpected error text: {error}");
    }

    #[test]
    fn well_formed_churn_data_yields_offers() {
        let response = offers_for("C1", Some(report_json("C1", 0.9)));
        assert_eq!(response.status, 200, "Expected 200, got {}", response.body);
        assert_eq!(response.body["total_offers"], 2);
        assert_eq!(response.body["source"], "retention_offer");
    }

    #[test]
    fn empty_churn_data_request_still_parses() {
        let line = r#"{"type":"generate_offers","customer_id":"C1","churn_data":{}}"#;
        let request: IpcRequest = serde_json::from_str(line).expect("request parses");
        assert!(matches!(request, IpcRequest::GenerateOffers { churn_data: Some(_), .. }));
    }
}
