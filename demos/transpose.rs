//! Traces a blocked matrix transpose and prints the address trace
//!
//! Usage: `cargo run --example transpose -- [size] [block]`
//!
//! The trace goes to stdout in the `<op> <hex-address>,<size> <slot-id>` format;
//! a register usage summary goes to stderr.

use anyhow::{bail, Context, Result};
use regtrace::{ArithOp, Pointer, Session, Word};

/// `B = Aᵀ` for a `size x size` matrix, moving `block x block` tiles
fn transpose<'s>(
    session: &'s Session,
    a: &Pointer<'s>,
    b: &Pointer<'s>,
    size: Word,
    block: Word,
) -> regtrace::Result<()> {
    let mut row = session.register(0)?;
    while row.lt(size)? {
        let mut col = session.register(0)?;
        while col.lt(size)? {
            let mut i = row.try_clone()?;
            while i.lt((&row + block)?)? {
                let mut j = col.try_clone()?;
                while j.lt((&col + block)?)? {
                    // A[i][j] -> B[j][i]
                    let mut src = session.register((&i * size)?)?;
                    src.update(ArithOp::Add, &j)?;
                    let value = a.index(&src)?.load()?;

                    let mut dst = session.register((&j * size)?)?;
                    dst.update(ArithOp::Add, &i)?;
                    b.index(&dst)?.store(&value)?;

                    j.increment()?;
                }
                i.increment()?;
            }
            col.update(ArithOp::Add, block)?;
        }
        row.update(ArithOp::Add, block)?;
    }
    Ok(())
}

fn parse_arg(args: &[String], index: usize, default: Word) -> Result<Word> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid argument {:?}", raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let size = parse_arg(&args, 1, 8)?;
    let block = parse_arg(&args, 2, 4)?;
    if size <= 0 || block <= 0 || size % block != 0 {
        bail!("size must be a positive multiple of block");
    }

    let Some(area) = size.checked_mul(size) else {
        bail!("size {} is too large", size);
    };

    let session = Session::new();
    let cells = area as usize;
    let input: Vec<Word> = (0..area).collect();
    let a_raw = session.load_buffer(&input)?;
    let b_raw = session.allocate_buffer(cells)?;
    session.set_address_mapping(a_raw, 0x30_0000)?;

    {
        let a = session.pointer(a_raw)?;
        let b = session.pointer(b_raw)?;
        transpose(&session, &a, &b, size, block)?;
    }

    let output = session.read_buffer(b_raw, cells);
    for i in 0..size {
        for j in 0..size {
            if output[(j * size + i) as usize] != input[(i * size + j) as usize] {
                bail!("transpose mismatch at ({}, {})", i, j);
            }
        }
    }

    session.write_trace(&mut std::io::stdout().lock())?;
    eprintln!(
        "accesses: {}, registers: peak {} of {}",
        session.event_count(),
        session.peak_register_count(),
        regtrace::REGISTER_CAPACITY
    );
    Ok(())
}
