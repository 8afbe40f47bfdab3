mod mocks;
mod preview;
mod webhook;
