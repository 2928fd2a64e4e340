use puzzle_sat::config::Settings;
use puzzle_sat::numberlink::{EncodingOptions, NumberlinkEncoding, NumberlinkHint, NumberlinkPuzzle};
use puzzle_sat::problem::{create_example_puzzles, decode_offline, solve_batch, EXAMPLE_NUMBERLINK, EXAMPLE_SUDOKU};
use puzzle_sat::sat::{parse_dimacs, SatSolver, SolverOptions};
use puzzle_sat::sudoku::{SudokuEncoding, SudokuPuzzle};
use puzzle_sat::{solve_numberlink_file, solve_sudoku_file, NumberlinkProblem, SudokuProblem};
use tempfile::tempdir;

const CLASSIC_SOLUTION: [&str; 9] = [
    "534678912",
    "672195348",
    "198342567",
    "859761423",
    "426853791",
    "713924856",
    "961537284",
    "287419635",
    "345286179",
];

const ALL_OPTIONS: [EncodingOptions; 4] = [
    EncodingOptions {
        u_shape: false,
        u_shape_long: false,
    },
    EncodingOptions {
        u_shape: true,
        u_shape_long: false,
    },
    EncodingOptions {
        u_shape: false,
        u_shape_long: true,
    },
    EncodingOptions {
        u_shape: true,
        u_shape_long: true,
    },
];

fn numberlink(rows: usize, cols: usize, endpoints: &[(usize, usize, usize, usize)]) -> NumberlinkPuzzle {
    let hints = endpoints
        .iter()
        .enumerate()
        .flat_map(|(line, &(r1, c1, r2, c2))| {
            [NumberlinkHint::new(line, r1, c1), NumberlinkHint::new(line, r2, c2)]
        })
        .collect();
    NumberlinkPuzzle::new(rows, cols, endpoints.len(), hints).unwrap()
}

fn settings_with(options: EncodingOptions) -> Settings {
    let mut settings = Settings::default();
    settings.encoding.u_shape = options.u_shape;
    settings.encoding.u_shape_long = options.u_shape_long;
    settings
}

fn numberlink_verdict(puzzle: &NumberlinkPuzzle, options: EncodingOptions) -> bool {
    let problem = NumberlinkProblem::new(settings_with(options), puzzle.clone()).unwrap();
    problem.solve().unwrap().is_satisfiable()
}

#[test]
fn empty_sudoku_is_satisfiable_and_valid() {
    let puzzle = SudokuPuzzle::empty();
    let outcome = SudokuProblem::new(Settings::default(), puzzle.clone()).solve().unwrap();

    assert!(outcome.is_satisfiable());
    assert_eq!(outcome.solutions.len(), 1);
    assert!(outcome.solutions[0].is_valid(&puzzle));
    assert!(outcome.violations.is_empty());
    assert_eq!(outcome.report.variable_count, 729);
    assert_eq!(outcome.report.clause_count, 10287);
}

#[test]
fn classic_sudoku_has_a_unique_solution() {
    let puzzle = SudokuPuzzle::parse(EXAMPLE_SUDOKU).unwrap();
    let mut settings = Settings::default();
    settings.solver.max_solutions = 3;

    let outcome = SudokuProblem::new(settings, puzzle.clone()).solve().unwrap();
    assert_eq!(outcome.solutions.len(), 1);

    let solution = &outcome.solutions[0];
    assert!(solution.is_valid(&puzzle));
    for (i, row) in CLASSIC_SOLUTION.iter().enumerate() {
        let digits: String = solution.grid[i].iter().map(|d| char::from(b'0' + d)).collect();
        assert_eq!(&digits, row);
    }
}

#[test]
fn contradictory_sudoku_reports_core() {
    // two 5s in the first row
    let puzzle = SudokuPuzzle::parse("p sudoku 9 9\n1 1 5\n1 9 5\n").unwrap();
    let outcome = SudokuProblem::new(Settings::default(), puzzle).solve().unwrap();

    assert!(!outcome.is_satisfiable());
    assert!(outcome.solutions.is_empty());
    assert!(!outcome.core.is_empty());
    assert!(outcome.core.iter().any(|clause| clause == "[p_00=4]"));
    assert!(outcome.core.iter().any(|clause| clause == "[p_08=4]"));
}

#[test]
fn numberlink_opposite_corners() {
    let puzzle = numberlink(4, 4, &[(0, 0, 3, 3)]);

    for options in ALL_OPTIONS {
        let problem = NumberlinkProblem::new(settings_with(options), puzzle.clone()).unwrap();
        let outcome = problem.solve().unwrap();
        assert!(outcome.is_satisfiable());

        let solution = &outcome.solutions[0];
        assert!(solution.is_valid(&puzzle), "{:?}", solution.violations(&puzzle));

        let paths = solution.trace_paths(&puzzle);
        assert_eq!(paths.len(), 1);
        let steps = paths[0].len() - 1;
        assert!(steps >= 6);
        assert_eq!(steps % 2, 0);
        assert_eq!(paths[0].last(), Some(&(3, 3)));
    }
}

#[test]
fn numberlink_endpoints_on_the_same_cell_are_unsat() {
    let puzzle = numberlink(4, 4, &[(1, 2, 1, 2)]);
    for options in ALL_OPTIONS {
        assert!(!numberlink_verdict(&puzzle, options));
    }
}

#[test]
fn numberlink_crossing_lines_are_unsat() {
    let puzzle = numberlink(3, 3, &[(0, 1, 2, 1), (1, 0, 1, 2)]);

    let problem = NumberlinkProblem::new(Settings::default(), puzzle.clone()).unwrap();
    let outcome = problem.solve().unwrap();
    assert!(!outcome.is_satisfiable());
    assert!(!outcome.core.is_empty());

    for options in ALL_OPTIONS {
        assert!(!numberlink_verdict(&puzzle, options));
    }
}

#[test]
fn u_shape_forces_direct_edge() {
    let puzzle = numberlink(2, 2, &[(0, 0, 0, 1)]);
    let options = EncodingOptions {
        u_shape: true,
        u_shape_long: false,
    };
    let mut settings = settings_with(options);
    settings.solver.max_solutions = 5;

    let problem = NumberlinkProblem::new(settings, puzzle.clone()).unwrap();
    let outcome = problem.solve().unwrap();
    assert_eq!(outcome.solutions.len(), 1);

    let solution = &outcome.solutions[0];
    assert!(solution.has_east(0, 0));
    assert_eq!(solution.edge_count(), 1);
    assert!(solution.is_valid(&puzzle));
}

#[test]
fn without_u_shape_the_detour_is_also_a_model() {
    let puzzle = numberlink(2, 2, &[(0, 0, 0, 1)]);
    let mut settings = Settings::default();
    settings.solver.max_solutions = 5;

    let outcome = NumberlinkProblem::new(settings, puzzle.clone()).unwrap().solve().unwrap();
    assert_eq!(outcome.solutions.len(), 2);
    assert!(outcome.solutions.iter().all(|s| s.is_valid(&puzzle)));
    assert!(outcome.solutions.iter().any(|s| s.edge_count() == 3));
}

#[test]
fn redundancy_constraints_keep_the_verdict() {
    let puzzles = vec![
        numberlink(4, 4, &[(0, 0, 3, 3)]),
        numberlink(4, 4, &[(0, 0, 0, 3), (3, 0, 3, 3)]),
        // endpoints in the middle of U-shape-long windows
        numberlink(4, 4, &[(1, 1, 2, 2), (1, 2, 2, 1)]),
        numberlink(3, 4, &[(1, 1, 1, 2), (0, 0, 2, 3)]),
        numberlink(5, 5, &[(0, 0, 0, 4), (1, 0, 4, 0), (2, 1, 4, 4)]),
        numberlink(3, 3, &[(0, 1, 2, 1), (1, 0, 1, 2)]),
        numberlink(2, 3, &[(0, 0, 1, 2), (0, 2, 1, 0)]),
    ];

    for puzzle in &puzzles {
        let baseline = numberlink_verdict(puzzle, ALL_OPTIONS[0]);
        for options in &ALL_OPTIONS[1..] {
            assert_eq!(
                numberlink_verdict(puzzle, *options),
                baseline,
                "{:?} changed the verdict of\n{}",
                options,
                puzzle.to_problem_string()
            );
        }
    }
}

#[test]
fn concurrent_encodings_match_sequential() {
    let sudoku = SudokuPuzzle::parse(EXAMPLE_SUDOKU).unwrap();
    let grid = numberlink(5, 5, &[(0, 0, 0, 4), (1, 0, 4, 0), (2, 1, 4, 4)]);
    let options = ALL_OPTIONS[3];

    let expected_sudoku = SudokuEncoding::encode(&sudoku).formula.to_dimacs();
    let expected_grid = NumberlinkEncoding::encode(&grid, options).unwrap().formula.to_dimacs();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sudoku = sudoku.clone();
            let grid = grid.clone();
            std::thread::spawn(move || {
                (
                    SudokuEncoding::encode(&sudoku).formula.to_dimacs(),
                    NumberlinkEncoding::encode(&grid, options).unwrap().formula.to_dimacs(),
                )
            })
        })
        .collect();

    for handle in handles {
        let (sudoku_text, grid_text) = handle.join().unwrap();
        assert_eq!(sudoku_text, expected_sudoku);
        assert_eq!(grid_text, expected_grid);
    }
}

#[test]
fn exported_dimacs_solves_the_same_and_decodes_offline() {
    let dir = tempdir().unwrap();
    let dimacs_path = dir.path().join("sudoku.cnf");
    let meaning_path = dir.path().join("id_to_str.json");
    let result_path = dir.path().join("result.txt");

    let mut settings = Settings::default();
    settings.output.dimacs_file = Some(dimacs_path.clone());
    settings.output.meaning_file = Some(meaning_path.clone());

    let puzzle = SudokuPuzzle::parse(EXAMPLE_SUDOKU).unwrap();
    let outcome = SudokuProblem::new(settings, puzzle.clone()).solve().unwrap();
    let expected = outcome.solutions[0].clone();

    // re-solve the exported text as an external solver would
    let cnf = parse_dimacs(&std::fs::read_to_string(&dimacs_path).unwrap()).unwrap();
    let mut solver = SatSolver::new(cnf.variable_count, SolverOptions::default());
    solver.add_clauses(&cnf.clauses).unwrap();
    let report = solver.solve().unwrap();
    let model = report.model().unwrap();

    let values: Vec<String> = model.values().iter().map(|v| v.to_string()).collect();
    std::fs::write(&result_path, format!("s SATISFIABLE\nv {} 0\n", values.join(" "))).unwrap();

    let decoded = decode_offline(&meaning_path, &result_path).unwrap();
    assert!(decoded.satisfiable);
    assert_eq!(decoded.true_names.len(), 81);
    assert_eq!(decoded.sudoku_grid(), Some(expected));
}

#[test]
fn batch_solves_example_directory() {
    let dir = tempdir().unwrap();
    create_example_puzzles(dir.path()).unwrap();
    std::fs::write(dir.path().join("broken.nl"), "SIZE 3X3\n").unwrap();

    let mut settings = Settings::default();
    settings.batch.threads = Some(2);
    let entries = solve_batch(dir.path(), &settings).unwrap();

    assert_eq!(entries.len(), 4);
    for entry in &entries {
        let name = entry.path.file_name().unwrap().to_string_lossy();
        if name == "broken.nl" {
            assert!(entry.result.is_err());
        } else {
            let verdict = entry.result.as_ref().unwrap();
            assert!(verdict.satisfiable, "{} should be satisfiable", name);
            assert!(verdict.valid, "{} should decode to a valid solution", name);
        }
    }
}

#[test]
fn puzzle_files_solve_through_library_entry_points() {
    let dir = tempdir().unwrap();
    let sudoku_path = dir.path().join("classic.sudoku");
    let grid_path = dir.path().join("three_lines.nl");
    std::fs::write(&sudoku_path, EXAMPLE_SUDOKU).unwrap();
    std::fs::write(&grid_path, EXAMPLE_NUMBERLINK).unwrap();

    let outcome = solve_sudoku_file(Settings::default(), &sudoku_path).unwrap();
    assert!(outcome.is_satisfiable());
    assert!(outcome.violations.is_empty());

    let outcome = solve_numberlink_file(Settings::default(), &grid_path).unwrap();
    assert!(outcome.is_satisfiable());
    assert!(outcome.violations.is_empty());
    let puzzle = NumberlinkPuzzle::parse(EXAMPLE_NUMBERLINK).unwrap();
    assert_eq!(outcome.solutions[0].trace_paths(&puzzle).len(), 3);

    assert!(solve_numberlink_file(Settings::default(), &sudoku_path).is_err());
}
