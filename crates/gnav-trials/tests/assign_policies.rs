use gnav_core::rng::RngHandle;
use gnav_core::{GenError, Graph, Problem, Reward};
use gnav_graph::{default_template, ring_graph};
use gnav_trials::{
    Eligibility, IntroTask, LearnTask, MainTask, RewardSource, SampleSource, ShuffleSource,
};
use proptest::prelude::*;

fn main_task(nodes: usize, eligibility: Eligibility) -> MainTask {
    MainTask {
        nodes,
        template: default_template(),
        n_steps: -1,
        eligibility,
    }
}

/// Yields the same sequence on every draw.
struct FixedSource(Vec<Reward>);

impl RewardSource for FixedSource {
    fn draw_len(&self) -> usize {
        self.0.len()
    }

    fn draw(&mut self, _rng: &mut RngHandle) -> &[Reward] {
        &self.0
    }
}

fn nonzero(problem: &Problem) -> Vec<usize> {
    (0..problem.len())
        .filter(|node| problem.rewards[*node] != 0)
        .collect()
}

#[test]
fn eligibility_rules_differ_on_the_start_node() {
    let mut adjacency = default_template().into_adjacency();
    adjacency.resize(7, Vec::new());
    let graph = Graph::from_adjacency(adjacency);
    assert_eq!(Eligibility::ExcludeStart.nodes(&graph, 0), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        Eligibility::IncludeStart.nodes(&graph, 0),
        vec![0, 1, 2, 3, 4, 5, 6]
    );
}

#[test]
fn main_task_spends_the_pool_exactly_once() {
    let pool = vec![-3, -2, -1, 1, 2, 3];
    let mut source = SampleSource::new(6, pool.clone()).unwrap();
    let mut rng = RngHandle::from_seed(99);
    let task = main_task(10, Eligibility::ExcludeStart);
    for _ in 0..20 {
        let problem = task.sample(&mut source, &mut rng).unwrap();
        assert_eq!(problem.rewards.len(), 10);
        assert_eq!(problem.rewards[problem.start], 0);
        let eligible = Eligibility::ExcludeStart.nodes(&problem.graph, problem.start);
        assert_eq!(nonzero(&problem), eligible);
        let mut values: Vec<_> = eligible.iter().map(|n| problem.rewards[*n]).collect();
        values.sort();
        assert_eq!(values, pool);
        assert_eq!(problem.value(), 0);
    }
}

#[test]
fn main_task_reports_short_reward_draws() {
    let mut source = SampleSource::new(6, vec![-3, -2, -1, 1, 2, 3]).unwrap();
    let task = main_task(9, Eligibility::IncludeStart);
    let err = task
        .sample(&mut source, &mut RngHandle::from_seed(1))
        .unwrap_err();
    match err {
        GenError::Rewards(info) => {
            assert_eq!(info.code, "reward-count");
            assert_eq!(info.context.get("required"), Some(&"7".to_string()));
            assert_eq!(info.context.get("produced"), Some(&"6".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn learn_task_rewards_the_first_two_children_in_order() {
    let task = LearnTask {
        nodes: 9,
        template: default_template(),
        n_steps: 1,
    };
    let mut source = ShuffleSource::new(vec![4, -4]);
    let mut rng = RngHandle::from_seed(17);
    for _ in 0..20 {
        let problem = task.sample(&mut source, &mut rng).unwrap();
        let children = problem.graph.children(problem.start).to_vec();
        let mut expected = vec![children[0], children[1]];
        expected.sort();
        assert_eq!(nonzero(&problem), expected);
        let pair = [problem.rewards[children[0]], problem.rewards[children[1]]];
        assert!(pair == [4, -4] || pair == [-4, 4]);
        assert_eq!(problem.rewards[problem.start], 0);
        assert_eq!(problem.n_steps, 1);
    }
}

#[test]
fn learn_task_keeps_source_order_on_the_children() {
    let task = LearnTask {
        nodes: 9,
        template: default_template(),
        n_steps: 1,
    };
    let mut source = FixedSource(vec![5, -7, 11]);
    let mut rng = RngHandle::from_seed(3);
    for _ in 0..10 {
        let problem = task.sample(&mut source, &mut rng).unwrap();
        let children = problem.graph.children(problem.start);
        assert_eq!(problem.rewards[children[0]], 5);
        assert_eq!(problem.rewards[children[1]], -7);
        assert!(!problem.rewards.contains(&11));
    }
}

#[test]
fn learn_task_fails_loudly_without_two_children() {
    let task = LearnTask {
        nodes: 5,
        template: Graph::from_adjacency(vec![vec![1], vec![]]),
        n_steps: 1,
    };
    let mut source = ShuffleSource::new(vec![1, 2]);
    let err = task
        .sample(&mut source, &mut RngHandle::from_seed(0))
        .unwrap_err();
    assert!(matches!(err, GenError::Template(info) if info.code == "start-children"));
}

#[test]
fn learn_task_needs_two_values() {
    let task = LearnTask {
        nodes: 9,
        template: default_template(),
        n_steps: 1,
    };
    let mut source = ShuffleSource::new(vec![1]);
    let err = task
        .sample(&mut source, &mut RngHandle::from_seed(0))
        .unwrap_err();
    assert!(matches!(err, GenError::Rewards(info) if info.code == "reward-count"));
}

#[test]
fn intro_task_pads_then_shuffles() {
    let task = IntroTask { nodes: 9, n_steps: -1 };
    let mut rng = RngHandle::from_seed(5);
    let problem = task.assign(vec![-4, -3, -2, -1, 1, 2, 3, 4], &mut rng).unwrap();
    assert_eq!(problem.graph, ring_graph(9).unwrap());
    assert_eq!(problem.start, 0);
    let mut values = problem.rewards.clone();
    values.sort();
    assert_eq!(values, vec![-4, -3, -2, -1, 0, 1, 2, 3, 4]);
}

#[test]
fn intro_task_truncates_before_shuffling() {
    let task = IntroTask { nodes: 3, n_steps: -1 };
    let problem = task
        .assign(vec![7, 8, 9, 10, 11], &mut RngHandle::from_seed(5))
        .unwrap();
    let mut values = problem.rewards.clone();
    values.sort();
    assert_eq!(values, vec![7, 8, 9]);
}

#[test]
fn intro_task_is_reproducible_per_seed() {
    let task = IntroTask { nodes: 9, n_steps: -1 };
    let a = task.assign(vec![1, 2, 3], &mut RngHandle::from_seed(8)).unwrap();
    let b = task.assign(vec![1, 2, 3], &mut RngHandle::from_seed(8)).unwrap();
    assert_eq!(a, b);
    let blank = task.blank(&mut RngHandle::from_seed(8)).unwrap();
    assert!(blank.rewards.iter().all(|r| *r == 0));
}

proptest! {
    #[test]
    fn main_problems_hold_their_invariants(seed in any::<u64>(), extra in 0usize..10) {
        let nodes = 7 + extra;
        let mut source = SampleSource::new(6, vec![-3, -2, -1, 1, 2, 3]).unwrap();
        let problem = main_task(nodes, Eligibility::ExcludeStart)
            .sample(&mut source, &mut RngHandle::from_seed(seed))
            .unwrap();
        prop_assert_eq!(problem.rewards.len(), nodes);
        prop_assert!(problem.start < nodes);
        prop_assert_eq!(problem.rewards[problem.start], 0);
        prop_assert_eq!(nonzero(&problem).len(), 6);
    }
}
