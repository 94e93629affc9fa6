use keepwire::io::{BufferInput, BufferOutput, CursorBuffer, WriteMode};
use keepwire::transport::SocketRefill;
use std::io::{self, BufRead, Cursor, Read, Write};

/// A refill that serves `data` in slices of at most `step` bytes.
fn sliced_source(
    data: Vec<u8>,
    step: usize,
) -> impl FnMut(&mut CursorBuffer) -> io::Result<Option<usize>> {
    let mut offset = 0;
    move |window: &mut CursorBuffer| -> io::Result<Option<usize>> {
        if offset == data.len() {
            return Ok(None);
        }
        let end = (offset + step).min(data.len());
        let count = window.put_slice(&data[offset..end]);
        offset += count;
        window.flip();
        Ok(Some(count))
    }
}

#[test]
fn test_input_reads_across_refills() {
    let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let mut input = BufferInput::new(16, sliced_source(data.clone(), 7)).unwrap();

    let mut out = Vec::new();
    input.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_input_reads_at_most_one_window_per_call() {
    let mut input = BufferInput::new(4, SocketRefill(Cursor::new(b"abcdefgh".to_vec()))).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(input.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"abcd");
    assert_eq!(input.read(&mut buf).unwrap(), 4);
    assert_eq!(input.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_input_rejects_zero_capacity() {
    let Err(err) = BufferInput::new(0, sliced_source(Vec::new(), 1)) else {
        panic!("a zero capacity input was accepted");
    };
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn test_input_zero_byte_refill_is_an_error() {
    let refill = |window: &mut CursorBuffer| -> io::Result<Option<usize>> {
        window.flip();
        Ok(Some(0))
    };
    let mut input = BufferInput::new(8, refill).unwrap();

    let err = input.read_byte().unwrap_err();
    assert_eq!(
        err.to_string(),
        "No bytes were read even though the end of input has not been reached."
    );
}

#[test]
fn test_input_refill_error_propagates() {
    let refill = |_: &mut CursorBuffer| -> io::Result<Option<usize>> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    };
    let mut input = BufferInput::new(8, refill).unwrap();

    let mut buf = [0u8; 1];
    let err = input.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
}

#[test]
fn test_input_byte_reads_skip_and_available() {
    let mut input = BufferInput::new(4, sliced_source(b"0123456789".to_vec(), 10)).unwrap();
    assert!(!input.mark_supported());
    assert_eq!(input.available(), 0);

    assert_eq!(input.read_byte().unwrap(), Some(b'0'));
    assert_eq!(input.available(), 3);

    assert_eq!(input.skip(5).unwrap(), 5);
    assert_eq!(input.read_byte().unwrap(), Some(b'6'));

    assert_eq!(input.skip(100).unwrap(), 3);
    assert_eq!(input.read_byte().unwrap(), None);
}

#[test]
fn test_input_buf_read_lines() {
    let text = b"first line\nsecond line\n".to_vec();
    let input = BufferInput::new(5, sliced_source(text, 3)).unwrap();

    let lines: Vec<String> = input.lines().map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["first line", "second line"]);
}

#[test]
fn test_output_drains_full_windows_then_flushes() {
    let mut drained: Vec<(WriteMode, Vec<u8>)> = Vec::new();

    {
        let sink = |window: &mut CursorBuffer, mode: WriteMode| -> io::Result<()> {
            drained.push((mode, window.chunk().to_vec()));
            window.advance(window.remaining());
            Ok(())
        };
        let mut output = BufferOutput::new(4, sink).unwrap();

        output.write_all(b"abcdefghij").unwrap();
        assert_eq!(output.buffered(), 2);
        output.flush().unwrap();
        assert_eq!(output.buffered(), 0);
    }

    assert_eq!(
        drained,
        vec![
            (WriteMode::Write, b"abcd".to_vec()),
            (WriteMode::Write, b"efgh".to_vec()),
            (WriteMode::Flush, b"ij".to_vec()),
        ]
    );
}

#[test]
fn test_output_close_is_idempotent_and_final() {
    let mut modes = Vec::new();

    {
        let sink = |window: &mut CursorBuffer, mode: WriteMode| -> io::Result<()> {
            modes.push(mode);
            window.advance(window.remaining());
            Ok(())
        };
        let mut output = BufferOutput::new(8, sink).unwrap();

        output.write_byte(7).unwrap();
        output.close().unwrap();
        output.close().unwrap();
        assert!(output.is_closed());

        let err = output.write(b"late").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    assert_eq!(modes, vec![WriteMode::Close]);
}

#[test]
fn test_output_leftover_bytes_are_an_error() {
    let lazy_sink = |window: &mut CursorBuffer, _: WriteMode| -> io::Result<()> {
        window.advance(1);
        Ok(())
    };
    let mut output = BufferOutput::new(8, lazy_sink).unwrap();

    output.write_all(b"abc").unwrap();
    let err = output.flush().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    assert_eq!(err.to_string(), "Output data could not be written.");

    // The window is reset even after a failed drain.
    assert_eq!(output.buffered(), 0);
}

#[test]
fn test_output_rejects_zero_capacity() {
    let sink = |_: &mut CursorBuffer, _: WriteMode| -> io::Result<()> { Ok(()) };
    let Err(err) = BufferOutput::new(0, sink) else {
        panic!("a zero capacity output was accepted");
    };
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn test_output_feeds_input_through_a_pipe() {
    let mut wire = Vec::new();
    {
        let sink = |window: &mut CursorBuffer, _: WriteMode| -> io::Result<()> {
            wire.extend_from_slice(window.chunk());
            window.advance(window.remaining());
            Ok(())
        };
        let mut output = BufferOutput::new(3, sink).unwrap();
        write!(output, "keep wire").unwrap();
        output.close().unwrap();
    }

    let mut input = BufferInput::new(2, SocketRefill(Cursor::new(wire))).unwrap();
    let mut text = String::new();
    input.read_to_string(&mut text).unwrap();
    assert_eq!(text, "keep wire");
}
