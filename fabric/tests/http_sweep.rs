mod common;

use common::*;
use fabric::transport::{fault_xml, serve_walk, Observation, WalkRequest};
use fabric::{Credentials, HostStatus, Sweep, SweepConfig, SweepConfigBuilder, SweepStatus, Target};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

const COMMUNITY: &str = "fabric-ro";

type Agents = Arc<HashMap<String, Vec<Observation>>>;

fn answer(agents: &Agents, agent: &str, community: Option<String>, body: &[u8]) -> warp::reply::WithStatus<String> {
    if community.as_deref() != Some(COMMUNITY) {
        return warp::reply::with_status(fault_xml("authorization failed"), StatusCode::FORBIDDEN);
    }
    let Some(observations) = agents.get(agent) else {
        return warp::reply::with_status(fault_xml("no such agent"), StatusCode::NOT_FOUND);
    };
    let request = match std::str::from_utf8(body)
        .map_err(|e| e.to_string())
        .and_then(|xml| WalkRequest::from_xml(xml).map_err(|e| e.to_string()))
    {
        Ok(request) => request,
        Err(e) => return warp::reply::with_status(fault_xml(&e), StatusCode::BAD_REQUEST),
    };
    let page = serve_walk(observations, &request);
    warp::reply::with_status(page.to_xml(), StatusCode::OK)
}

/// Serve every agent under `/{name}/walk` on an ephemeral port
fn start_agents(agents: Vec<(&str, Vec<Observation>)>) -> SocketAddr {
    let agents: Agents = Arc::new(
        agents
            .into_iter()
            .map(|(name, mut observations)| {
                observations.sort_by(|a, b| a.oid.cmp(&b.oid));
                (name.to_string(), observations)
            })
            .collect(),
    );
    let with_agents = warp::any().map(move || Arc::clone(&agents));

    let route = warp::post()
        .and(warp::path!(String / "walk"))
        .and(warp::header::optional::<String>("x-community"))
        .and(warp::body::bytes())
        .and(with_agents)
        .map(|agent: String, community: Option<String>, body: bytes::Bytes, agents: Agents| {
            answer(&agents, &agent, community, &body)
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn config(addr: SocketAddr, agents: &[&str], community: &str) -> SweepConfig {
    SweepConfigBuilder::from_config(SweepConfig::minimal())
        .max_repetitions(3)
        .targets(agents.iter().map(|name| {
            Target::new(*name, format!("http://{}/{}/", addr, name))
                .with_credentials(Credentials::community(community))
        }))
        .build()
        .unwrap()
}

fn fabric_agents() -> Vec<(&'static str, Vec<Observation>)> {
    vec![
        ("spine", spine()),
        ("leaf", leaf()),
        ("n17", compute_node("node-17")),
    ]
}

#[tokio::test]
async fn test_sweep_over_http() {
    let addr = start_agents(fabric_agents());
    let outcome = Sweep::new(config(addr, &["spine", "leaf", "n17"], COMMUNITY))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.report.status, SweepStatus::Complete);
    assert_eq!(outcome.store.node_count(), 3);
    assert_eq!(outcome.store.link_counters().total, 2);
    assert!(outcome.report.hosts.iter().all(|h| h.observations > 0));
}

#[tokio::test]
async fn test_rejected_community_fails_every_host() {
    let addr = start_agents(fabric_agents());
    let outcome = Sweep::new(config(addr, &["spine", "leaf", "n17"], "guess"))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.report.status, SweepStatus::NoData);
    assert!(outcome.store.is_empty());
    for host in &outcome.report.hosts {
        match &host.status {
            HostStatus::Failed(reason) => assert!(reason.contains("authorization failed")),
            other => panic!("{} should have failed, got {}", host.target, other),
        }
    }
}

#[tokio::test]
async fn test_unknown_agent_leaves_partial_fabric() {
    let addr = start_agents(fabric_agents());
    let outcome = Sweep::new(config(addr, &["spine", "leaf", "n17", "n18"], COMMUNITY))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.report.status, SweepStatus::PartiallyProcessed);
    assert!(!outcome.report.host("n18").unwrap().status.is_active());
    assert_eq!(outcome.store.link_counters().total, 2);
}
