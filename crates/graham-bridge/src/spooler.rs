// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows spooler backend.
//
// Jobs are submitted with the "RAW" datatype so the spooler hands the bytes
// to the port monitor as is, bypassing the GDI/XPS rendering path. Any
// open/start/write/end/close failure is folded into one `Spooler` error; the
// cleanup calls always run.

#![cfg(windows)]

use graham_core::error::{BridgeError, Result};
use tracing::{debug, info};
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW, OpenPrinterW,
    PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_HANDLE, PRINTER_INFO_4W,
    StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

use crate::embosser::EmbosserTable;
use crate::traits::PrintBackend;

const DOC_NAME: &str = "Graham Bridge BRF job";
const RAW_DATATYPE: &str = "RAW";

/// Raw printing through the Win32 print spooler.
#[derive(Debug, Clone, Default)]
pub struct SpoolerBackend {
    embossers: EmbosserTable,
}

impl SpoolerBackend {
    pub fn new(embossers: EmbosserTable) -> Self {
        Self { embossers }
    }
}

impl PrintBackend for SpoolerBackend {
    fn name(&self) -> &str {
        "windows-spooler"
    }

    fn send(&self, printer: &str, data: &[u8]) -> Result<()> {
        let framed = self.embossers.frame(printer, data);

        let name = wide(printer);
        let mut handle = PRINTER_HANDLE::default();
        // SAFETY: `name` is NUL-terminated and outlives the call; `handle` is
        // a valid out-pointer.
        unsafe { OpenPrinterW(PCWSTR(name.as_ptr()), &mut handle, None) }.map_err(|e| {
            BridgeError::Spooler(format!("unknown printer or access denied \"{printer}\": {e}"))
        })?;

        let mut failures = Vec::new();
        if let Err(e) = write_raw_job(handle, &framed) {
            failures.push(e);
        }
        // SAFETY: `handle` was opened above and is closed exactly once.
        if let Err(e) = unsafe { ClosePrinter(handle) } {
            failures.push(format!("close printer: {e}"));
        }

        if failures.is_empty() {
            info!(printer, bytes = framed.len(), "spooler accepted raw job");
            Ok(())
        } else {
            Err(BridgeError::Spooler(format!("\"{printer}\": {}", failures.join("; "))))
        }
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed = 0u32;
        let mut returned = 0u32;

        // First call sizes the buffer; it reports ERROR_INSUFFICIENT_BUFFER
        // whenever there is anything to return.
        // SAFETY: null buffer with valid out-pointers is the documented sizing call.
        let _ = unsafe { EnumPrintersW(flags, PCWSTR::null(), 4, None, &mut needed, &mut returned) };
        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; needed as usize];
        // SAFETY: `buffer` is `needed` bytes long as requested by the sizing call.
        unsafe {
            EnumPrintersW(
                flags,
                PCWSTR::null(),
                4,
                Some(buffer.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
        }
        .map_err(|e| BridgeError::Spooler(format!("enumerate printers: {e}")))?;

        let base = buffer.as_ptr().cast::<PRINTER_INFO_4W>();
        let mut names = Vec::with_capacity(returned as usize);
        for i in 0..returned as usize {
            // SAFETY: the spooler wrote `returned` PRINTER_INFO_4W records at
            // the start of `buffer`; the byte buffer is not aligned for the
            // struct so read it unaligned. String pointers point into `buffer`.
            let info = unsafe { std::ptr::read_unaligned(base.add(i)) };
            if info.pPrinterName.is_null() {
                continue;
            }
            match unsafe { info.pPrinterName.to_string() } {
                Ok(name) if !name.is_empty() => names.push(name),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "skipping printer with undecodable name"),
            }
        }
        Ok(names)
    }
}

/// Start a RAW document, write every byte, and end it.
fn write_raw_job(handle: PRINTER_HANDLE, data: &[u8]) -> std::result::Result<(), String> {
    let mut doc_name = wide(DOC_NAME);
    let mut datatype = wide(RAW_DATATYPE);
    let info = DOC_INFO_1W {
        pDocName: PWSTR(doc_name.as_mut_ptr()),
        pOutputFile: PWSTR::null(),
        pDatatype: PWSTR(datatype.as_mut_ptr()),
    };

    // SAFETY: `info` and the strings it points at live until the call returns.
    let job = unsafe { StartDocPrinterW(handle, 1, &info) };
    if job == 0 {
        return Err(format!("start raw document: {}", windows::core::Error::from_thread()));
    }
    debug!(job, bytes = data.len(), "spooler job started");

    let mut failures = Vec::new();
    // SAFETY: `handle` has an open document.
    match unsafe { StartPagePrinter(handle) }.ok() {
        Ok(()) => {
            if let Err(e) = write_all(handle, data) {
                failures.push(e);
            }
            // SAFETY: a page was started above.
            if let Err(e) = unsafe { EndPagePrinter(handle) }.ok() {
                failures.push(format!("end page: {e}"));
            }
        }
        Err(e) => failures.push(format!("start page: {e}")),
    }
    // SAFETY: a document was started above.
    if let Err(e) = unsafe { EndDocPrinter(handle) }.ok() {
        failures.push(format!("end document: {e}"));
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn write_all(handle: PRINTER_HANDLE, data: &[u8]) -> std::result::Result<(), String> {
    let mut offset = 0usize;
    while offset < data.len() {
        let chunk = &data[offset..];
        let len = u32::try_from(chunk.len()).unwrap_or(u32::MAX);
        let mut written = 0u32;
        // SAFETY: `chunk` is valid for `len` bytes; `written` is a valid out-pointer.
        unsafe { WritePrinter(handle, chunk.as_ptr().cast(), len, &mut written) }
            .ok()
            .map_err(|e| format!("write at byte {offset}: {e}"))?;
        if written == 0 {
            return Err(format!("spooler accepted no bytes at byte {offset}"));
        }
        offset += written as usize;
    }
    Ok(())
}

/// NUL-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
