mod datagram;
mod limits;
mod stream;
