use crate::prelude::*;

#[test]
fn test_move_display_and_parse() {
    let mv = Move::new(1, 4, 1, 3);
    assert_eq!(mv.to_string(), "1 4 1 3");
    assert_eq!("1 4 1 3".parse::<Move>().unwrap(), mv);
    assert_eq!("(1, 4, 1, 3)".parse::<Move>().unwrap(), mv);
    assert_eq!("1,4,1,3".parse::<Move>().unwrap(), mv);
    assert_eq!(mv.as_tuple(), (1, 4, 1, 3));
    assert_eq!(Move::from((1, 4, 1, 3)), mv);
}

#[test]
fn test_move_parse_errors() {
    assert!("1 4 1".parse::<Move>().is_err());
    assert!("1 4 1 3 2".parse::<Move>().is_err());
    assert!("a b c d".parse::<Move>().is_err());
    assert!("-1 0 0 0".parse::<Move>().is_err());
}

#[test]
fn test_tower_actions_respect_neighbourhood() {
    let grid = Grid::from_rows(&[[1, 1, 1], [1, 1, 1], [1, 1, 1]]).unwrap();
    let mut moves = Vec::new();
    move_gen::generate_tower_actions(&grid, MAX_HEIGHT, Cell::new(1, 1), &mut moves);
    assert_eq!(moves.len(), 8, "Centre tower reaches all 8 neighbours");

    moves.clear();
    move_gen::generate_tower_actions(&grid, MAX_HEIGHT, Cell::new(0, 0), &mut moves);
    assert_eq!(moves.len(), 3, "Corner tower has 3 neighbours");
}

#[test]
fn test_tower_frozen_by_height() {
    let grid = Grid::from_rows(&[[3, 3], [0, 4]]).unwrap();
    assert!(!move_gen::is_tower_movable(&grid, MAX_HEIGHT, Cell::new(0, 0)));
    assert!(!move_gen::is_tower_movable(&grid, MAX_HEIGHT, Cell::new(1, 1)));
    assert!(!move_gen::is_tower_movable(&grid, MAX_HEIGHT, Cell::new(1, 0)), "Empty cell");
    assert!(move_gen::is_settled(&grid, MAX_HEIGHT));
}
