use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jackc::{compile, lexer::tokenize};

const SQUARE: &str = r#"
/** A graphical square that can move and grow. */
class Square {
    field int x, y;
    field int size;

    constructor Square new(int ax, int ay, int asize) {
        let x = ax;
        let y = ay;
        let size = asize;
        do draw();
        return this;
    }

    method void dispose() {
        do Memory.deAlloc(this);
        return;
    }

    method void draw() {
        do Screen.setColor(true);
        do Screen.drawRectangle(x, y, x + size, y + size);
        return;
    }

    method void incSize() {
        if (((y + size) < 254) & ((x + size) < 510)) {
            do erase();
            let size = size + 2;
            do draw();
        }
        return;
    }

    method void erase() {
        do Screen.setColor(false);
        do Screen.drawRectangle(x, y, x + size, y + size);
        return;
    }

    method int area() {
        var Array cells;
        var int i, total;
        let cells = Array.new(size);
        while (i < size) {
            let cells[i] = size * i;
            let total = total + cells[i];
            let i = i + 1;
        }
        do Output.printString("area computed");
        return total;
    }
}
"#;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(SQUARE)).unwrap())
    });
    c.bench_function("compile", |b| {
        b.iter(|| compile(black_box(SQUARE)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
