use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lq_core::models::{EntityState, Role, BALL_TEAM};
use lq_core::replay::{AnalysisSession, EvaluationContext, RawFrame, RawSample};
use lq_core::{AttackDirection, LeakageEngine, LeakageQuadrant, ScoringInput};
use nalgebra::Vector2;

const ROLES: [&str; 11] = ["GK", "LB", "CB", "CB", "RB", "CM", "CM", "CAM", "LW", "ST", "RW"];

/// 11 v 11 spread over the pitch, Home attacking +x.
fn roster() -> Vec<EntityState> {
    let mut players = Vec::new();
    for (team, sign) in [("Home", -1.0f32), ("Away", 1.0f32)] {
        for (i, role) in ROLES.iter().enumerate() {
            let x = sign * (45.0 - 4.0 * i as f32);
            let z = ((i as f32) * 7.3) % 60.0 - 30.0;
            players.push(
                EntityState::new(format!("{team}{i}"), team, Role::from(*role), Vector2::new(x, z))
                    .with_velocity(Vector2::new(-sign * 3.0, 0.5)),
            );
        }
    }
    players
}

fn bench_score(c: &mut Criterion) {
    let engine = LeakageEngine::default();
    let players = roster();
    let attackers: Vec<&EntityState> = players.iter().filter(|p| p.team == "Home").collect();
    let defenders: Vec<&EntityState> = players.iter().filter(|p| p.team == "Away").collect();
    let lq = LeakageQuadrant::from_center(Vector2::new(25.0, 5.0), 12.0, 10.0);

    c.bench_function("leakage_score_11v11", |b| {
        b.iter(|| {
            let input = ScoringInput {
                lq: &lq,
                goal: engine.goal_for(AttackDirection::Positive),
                attackers: &attackers,
                defenders: &defenders,
                carrier: Some(attackers[5]),
                direction: Some(AttackDirection::Positive),
            };
            black_box(engine.score(black_box(&input)))
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let players = roster();
    let frames: Vec<RawFrame> = (0..250)
        .map(|i| RawFrame {
            timestamp_ms: i as f64 * 40.0,
            entities: players
                .iter()
                .enumerate()
                // Every fifth player drops out of every third frame
                .filter(|(j, _)| !(j % 5 == 0 && i % 3 == 1))
                .map(|(_, p)| RawSample {
                    id: p.id.clone(),
                    team: p.team.clone(),
                    role: p.role.to_string(),
                    x: p.position.x + 0.1 * i as f32,
                    y: p.position.y,
                })
                .chain(std::iter::once(RawSample {
                    id: "ball".into(),
                    team: BALL_TEAM.into(),
                    role: "BALL".into(),
                    x: 0.1 * i as f32,
                    y: 0.0,
                }))
                .collect(),
        })
        .collect();

    let mut session = AnalysisSession::default();
    if session.ingest_all(&frames).is_err() {
        return;
    }
    let ctx = EvaluationContext::new("Home", "Away", AttackDirection::Positive);
    let lq = LeakageQuadrant::from_center(Vector2::new(25.0, 5.0), 12.0, 10.0);

    let mut t = 0.0;
    c.bench_function("session_tick_and_score", |b| {
        b.iter(|| {
            t = (t + 17.0) % 10_000.0;
            session.advance_to(t);
            black_box(session.evaluate(&lq, &ctx))
        })
    });
}

criterion_group!(benches, bench_score, bench_tick);
criterion_main!(benches);
