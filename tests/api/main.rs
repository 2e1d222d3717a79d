// all api tests are bundled into a single binary: one link step instead of one
// per file
mod health_check;
mod helpers;
