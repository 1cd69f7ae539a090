use crate::analysis::cluster_predictor::ClusterAssignment;
use crate::analysis::recommender::RecommendationSet;
use crate::data::roles::Role;
use crate::engine::PlayerProfile;
use colored::*;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct RoleRow {
    role: String,
    picks: String,
}

pub fn display_profile(profile: &PlayerProfile) {
    println!(
        "\n{}",
        format!("🧭 Champion Compass for {}", profile.riot_id)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    display_cluster(&profile.cluster);
    display_recommendations(&profile.recommendations);
}

pub fn display_cluster(cluster: &ClusterAssignment) {
    if cluster.is_unidentified() {
        println!(
            "{} {} ({})\n",
            "Play style:".bold(),
            cluster.title.yellow(),
            cluster.description
        );
        return;
    }
    println!(
        "{} {} {}",
        "Play style:".bold(),
        cluster.title.green().bold(),
        format!("(cluster {})", cluster.id).dimmed()
    );
    println!("  {}\n", cluster.description);
}

pub fn display_recommendations(recommendations: &RecommendationSet) {
    if recommendations.input_champions.is_empty() {
        println!("{} none", "Most played:".bold());
    } else {
        println!(
            "{} {}",
            "Most played:".bold(),
            recommendations.input_champions.join(", ")
        );
    }

    if recommendations.insufficient_data {
        println!(
            "\n{}",
            "No recommendations available (not enough mastery data)".yellow()
        );
        println!();
        return;
    }

    let rows: Vec<RoleRow> = Role::ALL
        .iter()
        .map(|role| {
            let picks = recommendations
                .role(*role)
                .iter()
                .map(|pick| format!("{} ({}%)", pick.champion, pick.affinity))
                .collect::<Vec<_>>()
                .join(", ");
            RoleRow {
                role: role.to_string(),
                picks: if picks.is_empty() { "-".to_string() } else { picks },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{}", table);

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Picks are drawn from players whose champion pools look like yours");
    println!("• Percent: affinity relative to the strongest pick overall\n");
}

/// Response body in the shape the web front-end consumes.
pub fn profile_json(profile: &PlayerProfile) -> serde_json::Value {
    let recommendations: serde_json::Map<String, serde_json::Value> = Role::ALL
        .iter()
        .map(|role| {
            let names: Vec<&str> = profile
                .recommendations
                .role(*role)
                .iter()
                .map(|p| p.champion.as_str())
                .collect();
            (role.to_string(), json!(names))
        })
        .collect();

    json!({
        "riotId": profile.riot_id,
        "clusterId": profile.cluster.id,
        "clusterTitle": profile.cluster.title,
        "clusterDesc": profile.cluster.description,
        "inputChampions": profile.recommendations.input_champions,
        "insufficientData": profile.recommendations.insufficient_data,
        "recommendations": recommendations,
    })
}

pub fn display_existence(riot_id: &str, exists: bool) {
    if exists {
        display_success(&format!("{} exists", riot_id));
    } else {
        println!("{} {} was not found", "✗".red(), riot_id);
    }
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
