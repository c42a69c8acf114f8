//! Dump command implementation

use super::progress::byte_bar;
use crate::programmers;
use ispdetect_core::chip::CHIPS;
use ispdetect_core::context;
use ispdetect_core::isp::IspSession;
use ispdetect_core::programmer::IspMaster;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Chunk size for progress updates
const READ_CHUNK_SIZE: usize = 256;

/// Read a range of program memory into a file
pub fn run_dump(
    programmer: &str,
    output: &Path,
    start: u32,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let master = programmers::open_programmer(programmer)?;
    let mut session = IspSession::new(master);

    let result = match session.establish() {
        Ok(()) => read_range(&mut session, start, length),
        Err(e) => Err(e.into()),
    };
    session.teardown();
    let data = result?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;
    println!("Wrote {} bytes to {}", data.len(), output.display());
    Ok(())
}

fn read_range<M: IspMaster>(
    session: &mut IspSession<M>,
    start: u32,
    length: Option<u32>,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let target = context::probe(session, CHIPS)?;
    let len = match (length, target.profile) {
        (Some(len), _) => len,
        (None, Some(profile)) => profile.flash_size.saturating_sub(start),
        (None, None) => {
            return Err(format!(
                "Unrecognized signature {}, specify --length to read anyway",
                target.signature
            )
            .into())
        }
    };

    log::info!(
        "Reading {} bytes of program memory from {} starting at 0x{:X}",
        len,
        target.name(),
        start
    );

    let mut reader = target.memory_reader(session);
    let mut data = vec![0u8; len as usize];
    let pb = byte_bar(u64::from(len), "Reading");
    let mut addr = start;
    for chunk in data.chunks_mut(READ_CHUNK_SIZE) {
        reader.read(addr, chunk)?;
        addr += chunk.len() as u32;
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Read complete");

    log::debug!("{} extended address loads", reader.extended_reloads());
    Ok(data)
}
