use super::common::*;
use crate::workflows::offers::domain::{Catalog, Need, PreviousSupport, Stage, Urgency};
use crate::workflows::offers::matching::{MatchingConfig, MatchingEngine};
use crate::workflows::offers::profile::{MatchCriteria, ProfileBuilder};
use crate::workflows::offers::strategy::{MatchingStrategy, RuleBased};

fn engine() -> MatchingEngine {
    MatchingEngine::new(MatchingConfig::default())
}

fn criteria(profile: &crate::workflows::offers::domain::Profile) -> MatchCriteria {
    MatchCriteria::from(profile)
}

#[test]
fn single_offer_scenario_matches_by_stage_and_need() {
    let catalog = Catalog::new(vec![source(
        "FondX",
        &[],
        vec![call(
            "Bourse A",
            Some(Stage::Idee),
            &["financement"],
            "2024-02-01",
            None,
        )],
    )]);
    let profile = ProfileBuilder
        .build(form("idee", "financement"))
        .expect("profile builds");

    let result = engine().match_catalog(&catalog, &criteria(&profile), new_year());

    assert_eq!(result.len(), 1);
    assert_eq!(result.titles("FondX"), vec!["Bourse A"]);
}

#[test]
fn repeated_matching_is_identical() {
    let catalog = catalog();
    let profile = profile(Stage::Prototype, Need::Financier);

    let first = engine().match_catalog(&catalog, &criteria(&profile), new_year());
    let second = engine().match_catalog(&catalog, &criteria(&profile), new_year());

    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn sources_without_matches_are_omitted() {
    let result = engine().match_catalog(
        &catalog(),
        &criteria(&profile(Stage::Prototype, Need::Financier)),
        new_year(),
    );

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.titles("FondX"),
        vec!["Bourse A", "Prêt d'honneur"]
    );
    assert!(result.get("Incubateur Sud").is_none());
    assert!(result.get("Réseau Visibilité").is_none());
}

#[test]
fn seed_stage_offer_reaches_neighbouring_stages_only() {
    let catalog = catalog();
    let titles_for = |stage| {
        engine()
            .match_catalog(
                &catalog,
                &criteria(&profile(stage, Need::Financier)),
                new_year(),
            )
            .titles("FondX")
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    assert!(titles_for(Stage::Prototype).contains(&"Prêt d'honneur".to_string()));
    assert_eq!(titles_for(Stage::Developpement), vec!["Prêt d'honneur"]);
    assert_eq!(titles_for(Stage::Idee), vec!["Bourse A"]);
}

#[test]
fn non_cumulable_offer_excluded_only_for_supported_projects() {
    let catalog = catalog();
    let with_support = |previous_support| {
        let mut profile = profile(Stage::Amorcage, Need::Financier);
        profile.previous_support = previous_support;
        engine().match_catalog(&catalog, &criteria(&profile), new_year())
    };

    assert!(with_support(PreviousSupport::Yes).get("FondX").is_none());
    assert_eq!(
        with_support(PreviousSupport::No).titles("FondX"),
        vec!["Prêt d'honneur"]
    );
    assert_eq!(
        with_support(PreviousSupport::Unknown).titles("FondX"),
        vec!["Prêt d'honneur"]
    );
}

#[test]
fn offer_requiring_prior_support_excludes_first_timers() {
    let catalog = catalog();
    let mut first_timer = profile(Stage::Prototype, Need::Accompagnement);
    first_timer.previous_support = PreviousSupport::No;
    let mut supported = first_timer.clone();
    supported.previous_support = PreviousSupport::Yes;

    assert!(engine()
        .match_catalog(&catalog, &criteria(&first_timer), new_year())
        .is_empty());
    assert_eq!(
        engine()
            .match_catalog(&catalog, &criteria(&supported), new_year())
            .titles("Incubateur Sud"),
        vec!["Programme Incubation"]
    );
}

#[test]
fn urgency_limits_how_far_away_the_deadline_may_be() {
    let catalog = Catalog::new(vec![source(
        "FondX",
        &["financement"],
        vec![
            call("Court", Some(Stage::Idee), &[], "2024-01-20", None),
            call("Long", Some(Stage::Idee), &[], "2024-03-01", None),
        ],
    )]);
    let titles_for = |urgency| {
        engine()
            .match_catalog(
                &catalog,
                &criteria(&urgent_profile(Stage::Idee, Need::Financier, urgency)),
                new_year(),
            )
            .titles("FondX")
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    assert_eq!(titles_for(Urgency::Now), vec!["Court"]);
    assert_eq!(titles_for(Urgency::OneMonth), vec!["Court", "Long"]);
    assert_eq!(titles_for(Urgency::ThreeMonths), vec!["Court", "Long"]);
    assert_eq!(
        titles_for(Urgency::Other("plus tard".to_string())),
        vec!["Court", "Long"]
    );
}

#[test]
fn unreadable_deadline_only_counts_against_urgent_profiles() {
    let catalog = catalog();

    let relaxed = engine().match_catalog(
        &catalog,
        &criteria(&profile(Stage::Developpement, Need::Outil)),
        new_year(),
    );
    assert_eq!(relaxed.titles("Incubateur Sud"), vec!["Bootcamp Outils"]);

    let urgent = engine().match_catalog(
        &catalog,
        &criteria(&urgent_profile(
            Stage::Developpement,
            Need::Outil,
            Urgency::Now,
        )),
        new_year(),
    );
    assert!(urgent.is_empty());
}

#[test]
fn expired_offers_stay_listed_unless_configured_otherwise() {
    let catalog = catalog();
    let june = midnight(2024, 6, 1);
    let urgent = criteria(&urgent_profile(Stage::Idee, Need::Financier, Urgency::Now));

    let lenient = engine().match_catalog(&catalog, &urgent, june);
    assert_eq!(lenient.titles("FondX"), vec!["Bourse A"]);

    let strict = MatchingEngine::new(MatchingConfig { drop_expired: true })
        .match_catalog(&catalog, &urgent, june);
    assert!(strict.is_empty());
}

#[test]
fn need_matches_tags_case_insensitively_and_ignores_missing_stage() {
    let result = engine().match_catalog(
        &catalog(),
        &criteria(&profile(Stage::Idee, Need::Visibilite)),
        new_year(),
    );

    assert_eq!(result.titles("Réseau Visibilité"), vec!["Trophées"]);
}

#[test]
fn unconstrained_criteria_keep_catalog_order() {
    let result = engine().match_catalog(&catalog(), &MatchCriteria::default(), new_year());

    let names: Vec<_> = result
        .sources()
        .iter()
        .map(|source| source.name.as_str())
        .collect();
    assert_eq!(names, vec!["FondX", "Incubateur Sud", "Réseau Visibilité"]);
    assert_eq!(result.call_count(), 5);
}

#[test]
fn quick_filter_without_need_only_checks_stage() {
    let result = engine().match_catalog(
        &catalog(),
        &MatchCriteria::quick_filter(Some(Stage::Idee), None),
        new_year(),
    );

    assert_eq!(result.titles("FondX"), vec!["Bourse A"]);
    assert_eq!(
        result.titles("Incubateur Sud"),
        vec!["Programme Incubation"]
    );
    assert_eq!(result.titles("Réseau Visibilité"), vec!["Trophées"]);
}

#[test]
fn duplicate_source_names_share_one_group() {
    let catalog = Catalog::new(vec![
        source(
            "FondX",
            &[],
            vec![call("Un", None, &["financement"], "2024-02-01", None)],
        ),
        source(
            "Autre",
            &[],
            vec![call("Deux", None, &["financement"], "2024-02-01", None)],
        ),
        source(
            "FondX",
            &[],
            vec![call("Trois", None, &["financement"], "2024-02-01", None)],
        ),
    ]);

    let result = engine().match_catalog(
        &catalog,
        &criteria(&profile(Stage::Idee, Need::Financier)),
        new_year(),
    );

    assert_eq!(result.len(), 2);
    assert_eq!(result.sources()[0].name, "FondX");
    assert_eq!(result.titles("FondX"), vec!["Un", "Trois"]);
}

#[test]
fn empty_catalog_yields_empty_result() {
    let result = engine().match_catalog(
        &Catalog::default(),
        &criteria(&profile(Stage::Idee, Need::Financier)),
        new_year(),
    );

    assert!(result.is_empty());
    assert_eq!(result.call_count(), 0);
}

#[test]
fn rule_based_strategy_agrees_with_engine() {
    let engine = engine();
    let catalog = catalog();
    let criteria = criteria(&profile(Stage::Prototype, Need::Accompagnement));

    let strategy = RuleBased::new(&engine, criteria.clone(), new_year());

    assert_eq!(strategy.label(), "rule_based");
    assert_eq!(
        strategy.select(&catalog),
        engine.match_catalog(&catalog, &criteria, new_year())
    );
}
