use super::*;
use pretty_assertions::assert_eq;

fn class(name: &str) -> VarType {
    VarType::Class(name.to_string())
}

#[test]
fn test_indices_are_contiguous_per_kind() {
    let mut table = SymbolTable::default();
    table.define("count", VarType::Int, SymbolKind::Static).unwrap();
    table.define("x", VarType::Int, SymbolKind::Field).unwrap();
    table.define("y", VarType::Int, SymbolKind::Field).unwrap();
    table.define("next", class("Node"), SymbolKind::Field).unwrap();
    table.define("this", class("Node"), SymbolKind::Argument).unwrap();
    table.define("dx", VarType::Int, SymbolKind::Argument).unwrap();
    table.define("i", VarType::Int, SymbolKind::Local).unwrap();

    assert_eq!(table.var_count(SymbolKind::Static), 1);
    assert_eq!(table.var_count(SymbolKind::Field), 3);
    assert_eq!(table.var_count(SymbolKind::Argument), 2);
    assert_eq!(table.var_count(SymbolKind::Local), 1);

    assert_eq!(
        ["x", "y", "next"].map(|name| table.index_of(name).unwrap()),
        [0, 1, 2]
    );
    assert_eq!(table.index_of("dx"), Ok(1));
    assert_eq!(table.index_of("count"), Ok(0));
    assert_eq!(table.type_of("next"), Ok(&class("Node")));
    assert_eq!(table.kind_of("i"), Ok(SymbolKind::Local));
}

#[test]
fn test_subroutine_scope_shadows_class_scope() {
    let mut table = SymbolTable::default();
    table.define("x", VarType::Int, SymbolKind::Field).unwrap();
    table.define("x", VarType::Char, SymbolKind::Local).unwrap();

    assert_eq!(
        table.resolve("x"),
        Some(&Symbol {
            name: "x".to_string(),
            ty: VarType::Char,
            kind: SymbolKind::Local,
            index: 0,
        })
    );

    table.start_subroutine();
    assert_eq!(table.kind_of("x"), Ok(SymbolKind::Field));
    assert_eq!(table.resolve("x").map(Symbol::segment), Some(Segment::This));
}

#[test]
fn test_start_subroutine_clears_arguments_and_locals() {
    let mut table = SymbolTable::default();
    table.define("size", VarType::Int, SymbolKind::Static).unwrap();
    table.define("a", VarType::Int, SymbolKind::Argument).unwrap();
    table.define("b", VarType::Boolean, SymbolKind::Local).unwrap();

    table.start_subroutine();

    for name in ["a", "b"] {
        let unknown = SymbolError::Unknown(name.to_string());
        assert_eq!(table.kind_of(name), Err(unknown.clone()));
        assert_eq!(table.type_of(name), Err(unknown.clone()));
        assert_eq!(table.index_of(name), Err(unknown));
    }
    assert_eq!(table.var_count(SymbolKind::Argument), 0);
    assert_eq!(table.var_count(SymbolKind::Local), 0);
    assert_eq!(table.var_count(SymbolKind::Static), 1);

    let symbol = table.define("c", VarType::Int, SymbolKind::Local).unwrap();
    assert_eq!(symbol.index, 0);
}

#[test]
fn test_duplicate_declaration() {
    let mut table = SymbolTable::default();
    table.define("x", VarType::Int, SymbolKind::Field).unwrap();
    assert_eq!(
        table.define("x", VarType::Int, SymbolKind::Static),
        Err(SymbolError::Duplicate("x".to_string()))
    );
    table.define("i", VarType::Int, SymbolKind::Argument).unwrap();
    assert_eq!(
        table.define("i", VarType::Int, SymbolKind::Local),
        Err(SymbolError::Duplicate("i".to_string()))
    );
    // A rejected definition does not consume an index.
    assert_eq!(table.var_count(SymbolKind::Static), 0);
    assert_eq!(table.var_count(SymbolKind::Local), 0);
}

#[test]
fn test_errors_carry_span() {
    let error = SymbolError::Unknown("ghost".to_string()).at(4..9);
    assert_eq!(
        error,
        Error::UnknownSymbol {
            span: 4..9,
            name: "ghost".to_string()
        }
    );
}
