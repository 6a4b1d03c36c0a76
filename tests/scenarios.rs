//! End-to-end distribution and sampling scenarios.

use u_numflow::random::create_rng;
use u_synthpop::attribute::Attribute;
use u_synthpop::distribution::{
    DependencyTree, HierarchicalHypothesis, IndependenceHypothesis, IpfConfig,
    IterativeProportionalFitting,
};
use u_synthpop::generator::PopulationGenerator;
use u_synthpop::matrix::{Coordinate, MatrixView, NDimensionalMatrix};
use u_synthpop::sampler::{AliasSampler, BasicSampler, Distribution, Sampler, SamplerKind};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Census {
    sex: Attribute,
    age: Attribute,
}

fn census() -> Census {
    Census {
        sex: Attribute::nominal("Sex", &["M", "F"]).unwrap(),
        age: Attribute::ordinal("Age", &["young", "old"]).unwrap(),
    }
}

fn joint(c: &Census, cells: &[(&str, &str, f64)]) -> NDimensionalMatrix {
    let mut m = NDimensionalMatrix::frequency("joint", vec![c.sex.clone(), c.age.clone()]);
    for &(s, a, p) in cells {
        m.set_value(&Coordinate::of(&[(&c.sex, s), (&c.age, a)]).unwrap(), p)
            .unwrap();
    }
    m
}

fn marginal(attribute: &Attribute, cells: &[(&str, f64)]) -> NDimensionalMatrix {
    let mut m = NDimensionalMatrix::frequency(attribute.name(), vec![attribute.clone()]);
    for &(label, p) in cells {
        m.set_value(&Coordinate::of(&[(attribute, label)]).unwrap(), p)
            .unwrap();
    }
    m
}

fn cell(m: &NDimensionalMatrix, pairs: &[(&Attribute, &str)]) -> f64 {
    m.get_val(&Coordinate::of(pairs).unwrap()).unwrap().value()
}

const SCENARIO_A: [(&str, &str, f64); 4] = [
    ("M", "young", 0.3),
    ("M", "old", 0.2),
    ("F", "young", 0.1),
    ("F", "old", 0.4),
];

#[test]
fn scenario_a_marginal_and_alias_population() {
    init_logger();
    let c = census();
    let m = joint(&c, &SCENARIO_A);
    assert!((cell(&m, &[(&c.sex, "M")]) - 0.5).abs() < 1e-12);

    let generator = PopulationGenerator::from_view(&m, SamplerKind::Alias).unwrap();
    let population = generator.generate_seeded(10_000, 2024).unwrap();
    assert_eq!(population.len(), 10_000);

    let counts = population.contingency_table(std::slice::from_ref(&c.sex));
    let share = cell(&counts, &[(&c.sex, "M")]) / counts.total();
    assert!((0.49..=0.51).contains(&share), "Sex=M share {share}");
}

#[test]
fn scenario_b_ipf_converges_to_independence() {
    init_logger();
    let c = census();
    let seed = joint(
        &c,
        &[
            ("M", "young", 0.25),
            ("M", "old", 0.25),
            ("F", "young", 0.25),
            ("F", "old", 0.25),
        ],
    );
    let controls = [
        marginal(&c.sex, &[("M", 0.5), ("F", 0.5)]),
        marginal(&c.age, &[("young", 0.4), ("old", 0.6)]),
    ];
    let result = IterativeProportionalFitting::run(&seed, &controls, &IpfConfig::default()).unwrap();
    assert!(result.converged);

    for (s, a, expected) in [
        ("M", "young", 0.20),
        ("M", "old", 0.30),
        ("F", "young", 0.20),
        ("F", "old", 0.30),
    ] {
        let got = cell(&result.matrix, &[(&c.sex, s), (&c.age, a)]);
        assert!((got - expected).abs() < 1e-6, "{s}/{a}: {got}");
    }

    // same answer as the independence product of the controls
    let product = IndependenceHypothesis::build("product", &controls).unwrap();
    for (coordinate, value) in product.iter() {
        let fitted = result.matrix.get_val(coordinate).unwrap().value();
        assert!((fitted - value.value()).abs() < 1e-6);
    }
}

#[test]
fn ipf_is_idempotent_on_its_output() {
    let c = census();
    let config = IpfConfig::default().with_convergence_threshold(1e-8);
    let seed = joint(&c, &SCENARIO_A);
    let controls = [
        marginal(&c.sex, &[("M", 0.6), ("F", 0.4)]),
        marginal(&c.age, &[("young", 0.3), ("old", 0.7)]),
    ];
    let first = IterativeProportionalFitting::run(&seed, &controls, &config).unwrap();
    assert!(first.converged);

    let second = IterativeProportionalFitting::run(&first.matrix, &controls, &config).unwrap();
    assert!(second.converged);
    for (coordinate, value) in first.matrix.iter() {
        let again = second.matrix.get_val(coordinate).unwrap().value();
        let change = (again - value.value()).abs() / value.value();
        assert!(change <= config.convergence_threshold, "{coordinate}: {change:e}");
    }
}

#[test]
fn alias_and_basic_agree_with_source() {
    let c = census();
    let m = joint(&c, &SCENARIO_A);
    let distribution = Distribution::from_view(&m).unwrap();
    let alias = AliasSampler::new(distribution.clone()).unwrap();
    let basic = BasicSampler::new(distribution);

    let n = 100_000;
    let alias_draws = alias.draw_n(n, &mut create_rng(1)).unwrap();
    let basic_draws = basic.draw_n(n, &mut create_rng(2)).unwrap();

    for &(s, a, p) in &SCENARIO_A {
        let target = Coordinate::of(&[(&c.sex, s), (&c.age, a)]).unwrap();
        let from_alias = alias_draws.iter().filter(|d| **d == target).count() as f64 / n as f64;
        let from_basic = basic_draws.iter().filter(|d| **d == target).count() as f64 / n as f64;
        assert!((from_alias - p).abs() < 1e-2, "alias {s}/{a}: {from_alias}");
        assert!((from_basic - p).abs() < 1e-2, "basic {s}/{a}: {from_basic}");
        assert!((from_alias - from_basic).abs() < 2e-2);
    }
}

#[test]
fn hierarchical_generation_respects_conditionals() {
    init_logger();
    let size = Attribute::ordinal("Size", &["small", "large"]).unwrap();
    let cars = Attribute::integer("Cars", 0..=2).unwrap();
    let tree = DependencyTree::new(&[(size.clone(), None), (cars.clone(), Some(size.clone()))]).unwrap();

    let mut hypothesis = HierarchicalHypothesis::new(tree);
    hypothesis
        .set_root_marginal(marginal(&size, &[("small", 0.7), ("large", 0.3)]))
        .unwrap();
    hypothesis
        .set_conditional(
            size.value_of("small").unwrap(),
            marginal(&cars, &[("0", 0.5), ("1", 0.5)]),
        )
        .unwrap();
    hypothesis
        .set_conditional(size.value_of("large").unwrap(), marginal(&cars, &[("2", 1.0)]))
        .unwrap();

    let generator = PopulationGenerator::hierarchical(&hypothesis, SamplerKind::Binary).unwrap();
    let population = generator.generate_seeded(5_000, 11).unwrap();
    let table = population.contingency_table(&[size.clone(), cars.clone()]);

    // large households always own two cars, small ones never do
    assert_eq!(cell(&table, &[(&size, "large"), (&cars, "0")]), 0.0);
    assert_eq!(cell(&table, &[(&size, "large"), (&cars, "1")]), 0.0);
    assert_eq!(cell(&table, &[(&size, "small"), (&cars, "2")]), 0.0);

    let large = cell(&table, &[(&size, "large")]) / table.total();
    assert!((large - 0.3).abs() < 0.03, "large share {large}");

    // the built joint agrees with the sampled one
    let joint = hypothesis.build().unwrap();
    let expected = joint
        .probability(&Coordinate::of(&[(&size, "small"), (&cars, "1")]).unwrap())
        .unwrap();
    assert!((expected - 0.35).abs() < 1e-9);
}
