use std::io::Read;
#[cfg(feature = "encoder")]
use std::io::Write;

/// Reader that remembers how many bytes it handed out.
pub(crate) struct CountingReader<R> {
    inner: R,
    read_bytes: u64,
}

impl<R> CountingReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            read_bytes: 0,
        }
    }

    pub(crate) fn read_bytes(&self) -> u64 {
        self.read_bytes
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = self.inner.read(buf)?;
        self.read_bytes += len as u64;
        Ok(len)
    }
}

/// Writer that remembers how many bytes went through it.
#[cfg(feature = "encoder")]
pub(crate) struct CountingWriter<W> {
    inner: W,
    written_bytes: u64,
}

#[cfg(feature = "encoder")]
impl<W> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            written_bytes: 0,
        }
    }

    pub(crate) fn written_bytes(&self) -> u64 {
        self.written_bytes
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(feature = "encoder")]
impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let len = self.inner.write(buf)?;
        self.written_bytes += len as u64;
        Ok(len)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
